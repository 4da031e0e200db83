//! Form pre-fill from the session.

use tw_core::SessionState;

/// Contact fields a signed-in user should not have to retype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefill {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl Prefill {
    /// Read the best-known contact details out of the session. Falls back to
    /// the sign-up metadata when the profile is not yet complete.
    #[must_use]
    pub fn from_session(session: &SessionState) -> Self {
        let identity = session.identity.as_ref();
        let profile = session.profile.as_ref();
        Self {
            user_id: identity.map(|i| i.id.clone()),
            name: profile
                .and_then(|p| p.full_name.clone())
                .or_else(|| identity.and_then(|i| i.metadata_str("full_name").map(String::from))),
            email: identity.map(|i| i.email.clone()),
            phone: profile.and_then(|p| p.phone.clone()),
            company: profile
                .and_then(|p| p.company_name.clone())
                .or_else(|| identity.and_then(|i| i.metadata_str("company").map(String::from))),
        }
    }
}
