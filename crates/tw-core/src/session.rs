//! In-memory projection of the current identity + profile + loading flag.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::profile::{Profile, Role};

/// Snapshot of the session at a point in time.
///
/// Invariant: `profile` is `None` whenever `identity` is `None`. The session
/// store in `tw-auth` is the only writer and enforces this on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    /// Auth resolution in progress — UI gates show a loading state instead of
    /// redirecting prematurely while this is set.
    pub loading: bool,
    /// The last profile fetch failed. Distinct from "no profile row exists":
    /// both leave `profile == None`, but callers can offer a retry on error.
    pub profile_error: bool,
}

impl SessionState {
    /// Whether an identity is present (signed in at the provider level).
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Resolved role, if a profile with a role tag is loaded.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().and_then(|p| p.role)
    }

    /// Whether the loaded profile is complete (name + role set).
    #[must_use]
    pub fn profile_complete(&self) -> bool {
        self.profile.as_ref().is_some_and(Profile::is_complete)
    }
}
