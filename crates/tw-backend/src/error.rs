//! Error taxonomy for the hosted backend boundary.

use thiserror::Error;

/// Errors from the identity endpoints.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but its email is unverified. Recoverable: callers
    /// must surface a resend-confirmation affordance bound to this email.
    #[error("email not confirmed: {email}")]
    EmailNotConfirmed { email: String },

    /// The provider returned an unexpected failure.
    #[error("provider error ({status}): {message}")]
    ProviderError { status: u16, message: String },

    /// Transport-level failure before a provider response arrived.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The persisted session could not be read or written.
    #[error("session store error: {0}")]
    SessionStoreError(String),

    /// The redirect-based OAuth flow could not be initiated or completed.
    #[error("OAuth flow failed: {0}")]
    OAuthFlowFailed(String),
}

/// Errors from data, storage and function endpoints.
///
/// "No row found" is not an error — keyed lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The backend returned an unexpected failure.
    #[error("provider error ({status}): {message}")]
    ProviderError { status: u16, message: String },

    /// Transport-level failure before a backend response arrived.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors surfaced to lead-capture callers on submission.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A form field failed validation before any request was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend write failed.
    #[error(transparent)]
    Backend(#[from] FetchError),
}
