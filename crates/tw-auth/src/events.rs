//! Auth-change events emitted by the identity bridge.

use tw_core::Identity;

/// One event on the auth-change stream.
///
/// The bridge emits these on its own schedule (sign-in calls, OAuth callback
/// arrival, token refresh timers); consumers must not assume synchronous
/// delivery relative to the request that caused them.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
    TokenRefreshed(Identity),
    UserUpdated(Identity),
}

impl AuthEvent {
    /// The identity carried by the event, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(i) | Self::TokenRefreshed(i) | Self::UserUpdated(i) => Some(i),
            Self::SignedOut => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::UserUpdated(_) => "user_updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.into(),
            email: format!("{id}@example.com"),
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn identity_is_carried_by_every_variant_but_sign_out() {
        assert_eq!(
            AuthEvent::SignedIn(identity("u-1")).identity().map(|i| i.id.as_str()),
            Some("u-1")
        );
        assert_eq!(
            AuthEvent::TokenRefreshed(identity("u-2")).identity().map(|i| i.id.as_str()),
            Some("u-2")
        );
        assert_eq!(
            AuthEvent::UserUpdated(identity("u-3")).identity().map(|i| i.id.as_str()),
            Some("u-3")
        );
        assert!(AuthEvent::SignedOut.identity().is_none());
        assert_eq!(AuthEvent::SignedOut.kind(), "signed_out");
    }
}
