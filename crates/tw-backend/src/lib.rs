//! # tw-backend
//!
//! Hosted backend-as-a-service client for Tradewind.
//!
//! One project of the hosted backend serves four surfaces, each behind its
//! own path prefix on the same base URL:
//! - identity (`/auth/v1`) — password + OAuth sign-in, sign-out, confirmation
//! - relational tables (`/rest/v1`) — insert/select/update/delete with filters
//! - file storage (`/storage/v1`) — object upload
//! - serverless functions (`/functions/v1`) — outbound email notifications
//!
//! [`BackendClient`] is a cheap-to-clone handle over a shared `reqwest`
//! client; the current access token is shared across clones so the auth
//! layer can swap it on sign-in/refresh and every data call picks it up.

pub mod auth;
pub mod functions;
pub mod jwt;
pub mod realtime;
pub mod session_store;
pub mod storage;
pub mod tables;

mod error;
mod http;

pub use auth::{AuthSession, OAuthProvider};
pub use error::{AuthError, FetchError, SubmissionError};
pub use realtime::{ChangeEvent, ChangeKind, Subscription};
pub use tables::Filter;

use std::sync::{Arc, RwLock};

/// HTTP client for one hosted backend project.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// Access token of the signed-in user, if any. Shared across clones so
    /// data calls authenticate as the user once the auth layer signs in.
    bearer: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    /// Create a client for the project at `base_url` with the publishable key.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent("tradewind/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("reqwest client should build"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    /// Base URL of the project (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install or clear the user access token used for data calls.
    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().expect("bearer lock poisoned") = token;
    }

    /// Token sent as `Authorization: Bearer` — the user's access token when
    /// signed in, the anon key otherwise (row-level security applies).
    fn bearer_token(&self) -> String {
        self.bearer
            .read()
            .expect("bearer lock poisoned")
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    /// Start a request with the project headers applied.
    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new("https://proj.example.co/", "anon");
        assert_eq!(client.base_url(), "https://proj.example.co");
    }

    #[test]
    fn bearer_defaults_to_anon_key_and_is_shared_across_clones() {
        let client = BackendClient::new("https://proj.example.co", "anon_key");
        assert_eq!(client.bearer_token(), "anon_key");

        let clone = client.clone();
        client.set_bearer(Some("user_token".into()));
        assert_eq!(clone.bearer_token(), "user_token");

        client.set_bearer(None);
        assert_eq!(clone.bearer_token(), "anon_key");
    }
}
