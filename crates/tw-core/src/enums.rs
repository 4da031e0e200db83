//! Lead workflow enums for Tradewind.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `LeadStatus` provides `allowed_next_states()` so the triage layer can enforce
//! valid transitions before writing to the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LeadStatus
// ---------------------------------------------------------------------------

/// Triage status of a lead (quote request, catalog request, application).
///
/// ```text
/// new → contacted → quoted → won
///                          → lost
/// (any) → archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Quoted,
    Won,
    Lost,
    Archived,
}

impl LeadStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::New => &[Self::Contacted, Self::Archived],
            Self::Contacted => &[Self::Quoted, Self::Lost, Self::Archived],
            Self::Quoted => &[Self::Won, Self::Lost, Self::Archived],
            Self::Won | Self::Lost => &[Self::Archived],
            Self::Archived => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Quoted => "quoted",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LeadKind
// ---------------------------------------------------------------------------

/// Which capture flow produced a lead. Doubles as the backing table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    QuoteRequest,
    CatalogRequest,
    JobApplication,
    PartnershipApplication,
}

impl LeadKind {
    /// Backing table in the hosted data store.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::QuoteRequest => "quote_requests",
            Self::CatalogRequest => "catalog_requests",
            Self::JobApplication => "job_applications",
            Self::PartnershipApplication => "partnership_applications",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuoteRequest => "quote_request",
            Self::CatalogRequest => "catalog_request",
            Self::JobApplication => "job_application",
            Self::PartnershipApplication => "partnership_application",
        }
    }
}

impl fmt::Display for LeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LeadStatus::New, LeadStatus::Contacted, true)]
    #[case(LeadStatus::New, LeadStatus::Won, false)]
    #[case(LeadStatus::Contacted, LeadStatus::Quoted, true)]
    #[case(LeadStatus::Quoted, LeadStatus::Won, true)]
    #[case(LeadStatus::Won, LeadStatus::Archived, true)]
    #[case(LeadStatus::Archived, LeadStatus::New, false)]
    #[case(LeadStatus::Lost, LeadStatus::Quoted, false)]
    fn status_transitions(
        #[case] from: LeadStatus,
        #[case] to: LeadStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&LeadStatus::New).unwrap(), "\"new\"");
        assert_eq!(
            serde_json::to_string(&LeadKind::QuoteRequest).unwrap(),
            "\"quote_request\""
        );
    }
}
