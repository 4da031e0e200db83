//! Role-scoped lead triage for the dashboards.
//!
//! The desk never widens what the backend's row policies already allow; it
//! refuses obviously out-of-scope reads up front so dashboards get a
//! [`DeskError::Forbidden`] instead of an empty, silently-filtered listing.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use tw_backend::realtime::Subscription;
use tw_backend::tables::Filter;
use tw_backend::{BackendClient, FetchError};
use tw_config::RealtimeConfig;
use tw_core::CoreError;
use tw_core::SessionState;
use tw_core::enums::{LeadKind, LeadStatus};
use tw_core::profile::Role;

/// Errors from the triage desk.
#[derive(Debug, Error)]
pub enum DeskError {
    /// The session's role may not see the requested lead kind.
    #[error("this account is not allowed to view these leads")]
    Forbidden,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Backend(#[from] FetchError),
}

/// How a session's reads of a lead kind are scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// All rows, newest first.
    All,
    /// Only rows owned by this user id.
    Own(String),
}

/// Decide the read scope for `session` over `kind`.
///
/// Admins see everything. Manufacturers see their own partnership
/// application and nothing else. Clients see their own rows of every kind.
///
/// # Errors
///
/// Returns [`DeskError::Forbidden`] for anonymous sessions and for
/// manufacturers reading outside the partnership table.
pub fn scope_for(session: &SessionState, kind: LeadKind) -> Result<Scope, DeskError> {
    let Some(identity) = session.identity.as_ref() else {
        return Err(DeskError::Forbidden);
    };
    match session.role() {
        Some(Role::Admin) => Ok(Scope::All),
        Some(Role::Manufacturer) => {
            if kind == LeadKind::PartnershipApplication {
                Ok(Scope::Own(identity.id.clone()))
            } else {
                Err(DeskError::Forbidden)
            }
        }
        Some(Role::Client) | None => Ok(Scope::Own(identity.id.clone())),
    }
}

impl Scope {
    fn filter(&self) -> Filter {
        match self {
            Self::All => Filter::new(),
            Self::Own(user_id) => Filter::new().eq("user_id", user_id),
        }
    }
}

/// Lead listing, workflow transitions and change feeds, scoped by role.
#[derive(Debug, Clone)]
pub struct LeadDesk {
    backend: BackendClient,
    poll_interval: Duration,
}

impl LeadDesk {
    #[must_use]
    pub fn new(backend: BackendClient, realtime: &RealtimeConfig) -> Self {
        Self {
            backend,
            poll_interval: Duration::from_millis(realtime.poll_interval_ms),
        }
    }

    /// List leads of `kind` visible to `session`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Forbidden`] if the session may not read `kind`,
    /// or the backend query error.
    pub async fn list<R>(&self, session: &SessionState, kind: LeadKind) -> Result<Vec<R>, DeskError>
    where
        R: DeserializeOwned,
    {
        let filter = scope_for(session, kind)?.filter().order("created_at", false);
        Ok(self.backend.select(kind.table(), &filter).await?)
    }

    /// Move lead `id` to `next`, enforcing the status workflow.
    ///
    /// The current row is read first so an out-of-order transition fails
    /// before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Forbidden`] unless the session is an admin,
    /// [`CoreError::NotFound`] if the lead does not exist, and
    /// [`CoreError::InvalidTransition`] when the workflow disallows the move.
    pub async fn transition(
        &self,
        session: &SessionState,
        kind: LeadKind,
        id: &str,
        next: LeadStatus,
    ) -> Result<(), DeskError> {
        if session.role() != Some(Role::Admin) {
            return Err(DeskError::Forbidden);
        }

        let filter = Filter::new().eq("id", id);
        let row: Value = self
            .backend
            .select_one(kind.table(), &filter)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity_type: kind.to_string(),
                id: id.to_string(),
            })?;

        let current: LeadStatus = row
            .get("status")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| FetchError::Decode(e.to_string()))?
            .ok_or_else(|| FetchError::Decode(format!("{} {id} has no status", kind.table())))?;

        if !current.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: kind.to_string(),
                id: id.to_string(),
                from: current.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        let patch = serde_json::json!({
            "status": next,
            "updated_at": chrono::Utc::now(),
        });
        let _updated: Vec<Value> = self.backend.update(kind.table(), &filter, &patch).await?;
        Ok(())
    }

    /// Subscribe to changes on `kind`, scoped exactly like [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Forbidden`] if the session may not read `kind`.
    pub fn subscribe(
        &self,
        session: &SessionState,
        kind: LeadKind,
    ) -> Result<Subscription, DeskError> {
        let filter = scope_for(session, kind)?.filter();
        Ok(self
            .backend
            .subscribe(kind.table(), filter, self.poll_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tw_core::{Identity, Profile};

    fn session(role: Option<Role>) -> SessionState {
        SessionState {
            identity: Some(Identity {
                id: "u-1".into(),
                email: "jane@example.com".into(),
                metadata: serde_json::Map::new(),
            }),
            profile: Some(Profile {
                id: "u-1".into(),
                full_name: Some("Jane Roe".into()),
                role,
                ..Profile::default()
            }),
            loading: false,
            profile_error: false,
        }
    }

    #[test]
    fn anonymous_sessions_see_nothing() {
        let result = scope_for(&SessionState::default(), LeadKind::QuoteRequest);
        assert!(matches!(result, Err(DeskError::Forbidden)));
    }

    #[rstest]
    #[case(LeadKind::QuoteRequest)]
    #[case(LeadKind::CatalogRequest)]
    #[case(LeadKind::JobApplication)]
    #[case(LeadKind::PartnershipApplication)]
    fn admins_see_everything(#[case] kind: LeadKind) {
        let scope = scope_for(&session(Some(Role::Admin)), kind).unwrap();
        assert_eq!(scope, Scope::All);
    }

    #[test]
    fn manufacturers_see_only_their_partnership_application() {
        let session = session(Some(Role::Manufacturer));
        let scope = scope_for(&session, LeadKind::PartnershipApplication).unwrap();
        assert_eq!(scope, Scope::Own("u-1".into()));
        assert!(matches!(
            scope_for(&session, LeadKind::QuoteRequest),
            Err(DeskError::Forbidden)
        ));
    }

    #[test]
    fn clients_and_roleless_profiles_see_their_own_rows() {
        let scope = scope_for(&session(Some(Role::Client)), LeadKind::QuoteRequest).unwrap();
        assert_eq!(scope, Scope::Own("u-1".into()));
        let scope = scope_for(&session(None), LeadKind::CatalogRequest).unwrap();
        assert_eq!(scope, Scope::Own("u-1".into()));
    }

    #[test]
    fn own_scope_compiles_to_a_user_filter() {
        let filter = Scope::Own("u-1".into()).filter();
        assert_eq!(
            filter.params(),
            &[("user_id".to_string(), "eq.u-1".to_string())]
        );
    }

    #[tokio::test]
    async fn non_admins_cannot_transition() {
        let backend = BackendClient::new("https://proj.example.co", "anon");
        let desk = LeadDesk::new(backend, &RealtimeConfig::default());
        let err = desk
            .transition(
                &session(Some(Role::Client)),
                LeadKind::QuoteRequest,
                "q-1",
                LeadStatus::Contacted,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Forbidden));
    }
}
