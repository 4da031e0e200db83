//! Cross-cutting error types for Tradewind.
//!
//! This module defines errors that can originate from any crate in the system.
//! Boundary-specific errors (`AuthError`, `FetchError`, `SubmissionError`) are
//! defined in `tw-backend` where the external service surface lives.

use thiserror::Error;

/// Errors that can be raised by any Tradewind crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A lead-status transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints, required fields).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
