use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authenticated principal as returned by the identity provider.
///
/// Produced by `tw-backend`, held by the session store as a reference copy.
/// Contains only data fields — no auth logic, no provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user ID (UUID string).
    pub id: String,
    /// Email address the account was registered with.
    pub email: String,
    /// Raw metadata bag supplied at sign-up (proposed full name, company, …).
    /// Unstructured by design — the provider stores whatever the sign-up form sent.
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

impl Identity {
    /// Best-effort read of a string field from the sign-up metadata.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_str_reads_string_fields() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("full_name".into(), "Jane Roe".into());
        metadata.insert("age".into(), 42.into());
        let identity = Identity {
            id: "u-1".into(),
            email: "jane@example.com".into(),
            metadata,
        };
        assert_eq!(identity.metadata_str("full_name"), Some("Jane Roe"));
        assert_eq!(identity.metadata_str("age"), None);
        assert_eq!(identity.metadata_str("missing"), None);
    }
}
