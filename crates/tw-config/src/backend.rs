//! Hosted backend (identity + data + storage + functions) configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend project, e.g. `https://abc.example.co`.
    #[serde(default)]
    pub url: String,

    /// Publishable (anon) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
}

impl BackendConfig {
    /// Check if the backend config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = BackendConfig::default();
        assert!(!config.is_configured());
    }

    #[test]
    fn configured_when_url_and_key_set() {
        let config = BackendConfig {
            url: "https://proj.example.co".into(),
            anon_key: "anon_123".into(),
        };
        assert!(config.is_configured());
    }

    #[test]
    fn not_configured_when_missing_key() {
        let config = BackendConfig {
            url: "https://proj.example.co".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }
}
