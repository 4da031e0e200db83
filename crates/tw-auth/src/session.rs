//! The session store — single source of truth for {identity, profile, loading}.
//!
//! Backed by a `tokio::sync::watch` channel: every mutation goes through
//! `send_modify`, so readers never observe a half-applied update and the
//! route gate re-evaluates on every change. The auth orchestrator is the
//! only writer; everything else holds read access.

use tokio::sync::watch;

use tw_core::{Identity, Profile, SessionState};

/// Process-wide session state container. No business logic of its own.
#[derive(Debug)]
pub struct SessionStore {
    state: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty store (no identity, no profile, not loading).
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    /// Current state, cloned. Synchronous and side-effect-free.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes (route gate, dashboards).
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Replace the identity. Does not touch the profile — callers pairing a
    /// new identity with its profile should use [`Self::set_authenticated`]
    /// so the identity/profile invariant holds at every observable point.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_modify(|s| s.identity = identity);
    }

    /// Replace the profile.
    pub fn set_profile(&self, profile: Option<Profile>) {
        self.state.send_modify(|s| s.profile = profile);
    }

    /// Toggle the "auth resolution in progress" flag.
    pub fn set_loading(&self, loading: bool) {
        self.state.send_modify(|s| s.loading = loading);
    }

    /// Record whether the last profile fetch failed.
    pub fn set_profile_error(&self, failed: bool) {
        self.state.send_modify(|s| s.profile_error = failed);
    }

    /// Install identity and profile in one update, clearing the loading flag.
    pub fn set_authenticated(&self, identity: Identity, profile: Option<Profile>) {
        self.state.send_modify(|s| {
            s.identity = Some(identity);
            s.profile = profile;
            s.loading = false;
        });
    }

    /// Reset to signed-out in one update. No reader can observe an identity
    /// without its profile having been cleared too.
    pub fn clear(&self) {
        self.state.send_modify(|s| *s = SessionState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.into(),
            email: format!("{id}@example.com"),
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::new();
        let state = store.snapshot();
        assert_eq!(state, SessionState::default());
        assert!(!state.loading);
    }

    #[test]
    fn clear_resets_everything_at_once() {
        let store = SessionStore::new();
        store.set_authenticated(
            identity("u-1"),
            Some(Profile {
                id: "u-1".into(),
                ..Profile::default()
            }),
        );
        store.set_loading(true);
        store.clear();

        let state = store.snapshot();
        assert!(state.identity.is_none());
        assert!(state.profile.is_none());
        assert!(!state.loading);
        assert!(!state.profile_error);
    }

    #[tokio::test]
    async fn watchers_see_each_mutation_as_one_change() {
        let store = SessionStore::new();
        let mut rx = store.watch();

        store.set_authenticated(identity("u-1"), None);
        rx.changed().await.expect("store alive");
        let seen = rx.borrow_and_update().clone();
        // identity landed together with its (absent) profile and loading=false
        assert!(seen.identity.is_some());
        assert!(seen.profile.is_none());
        assert!(!seen.loading);
    }
}
