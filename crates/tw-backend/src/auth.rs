//! Identity endpoints (`/auth/v1`).
//!
//! Password grant, sign-up, sign-out, confirmation resend, current-user
//! lookup, refresh grant, and the OAuth authorize URL. The provider's
//! failure bodies are mapped onto [`AuthError`] here so the auth layer above
//! never inspects HTTP details.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use tw_core::Identity;

use crate::BackendClient;
use crate::error::AuthError;
use crate::http::{ApiFailure, check_response};

/// OAuth providers the application offers on its login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    LinkedIn,
}

impl OAuthProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::LinkedIn => "linkedin_oidc",
        }
    }
}

/// A provider session: token pair plus the authenticated identity.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until `access_token` expires, as reported by the provider.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(rename = "user")]
    pub identity: ProviderUser,
}

impl AuthSession {
    /// The authenticated identity in domain form.
    #[must_use]
    pub fn to_identity(&self) -> Identity {
        self.identity.clone().into()
    }

    /// Absolute expiry instant derived from the provider's `expires_in` hint.
    ///
    /// `None` when the provider omitted the hint; callers fall back to
    /// decoding the token's `exp` claim.
    #[must_use]
    pub fn expires_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let secs = self.expires_in.and_then(|s| i64::try_from(s).ok())?;
        Some(chrono::Utc::now() + chrono::Duration::seconds(secs))
    }
}

/// User record as the identity endpoints serialize it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl From<ProviderUser> for Identity {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            metadata: user.user_metadata,
        }
    }
}

impl BackendClient {
    /// Sign in with an email/password pair.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the provider rejects the pair.
    /// - [`AuthError::EmailNotConfirmed`] when the account exists but is
    ///   unverified — callers must offer a resend-confirmation action.
    /// - [`AuthError::ProviderError`] / [`AuthError::NetworkError`] otherwise.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let resp = check_response(resp)
            .await
            .map_err(|f| map_auth_failure(&f, email))?;
        resp.json::<AuthSession>()
            .await
            .map_err(AuthError::NetworkError)
    }

    /// Create an account. `metadata` is the unstructured sign-up bag
    /// (proposed full name, company, role hint).
    ///
    /// Returns `Ok(None)` when the provider requires email confirmation
    /// before issuing a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the sign-up.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Map<String, Value>,
    ) -> Result<Option<AuthSession>, AuthError> {
        let url = format!("{}/auth/v1/signup", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let resp = check_response(resp)
            .await
            .map_err(|f| map_auth_failure(&f, email))?;
        let body: Value = resp.json().await.map_err(AuthError::NetworkError)?;
        if body.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(body).map_err(|e| {
                AuthError::ProviderError {
                    status: 200,
                    message: format!("malformed session payload: {e}"),
                }
            })?;
            return Ok(Some(session));
        }
        Ok(None)
    }

    /// Revoke the current session at the provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the logout call.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/logout", self.base_url());
        let resp = self.request(reqwest::Method::POST, url).send().await?;
        check_response(resp)
            .await
            .map_err(|f| map_auth_failure(&f, ""))?;
        Ok(())
    }

    /// Re-send the sign-up confirmation email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the resend call.
    pub async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/resend", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "type": "signup", "email": email }))
            .send()
            .await?;
        check_response(resp)
            .await
            .map_err(|f| map_auth_failure(&f, email))?;
        Ok(())
    }

    /// Fetch the identity behind `access_token`.
    ///
    /// Used during bootstrap to verify a persisted token is still live.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token is rejected or the call fails.
    pub async fn current_user(&self, access_token: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url());
        let resp = self
            .http_get_with_bearer(&url, access_token)
            .send()
            .await?;
        let resp = check_response(resp)
            .await
            .map_err(|f| map_auth_failure(&f, ""))?;
        let user: ProviderUser = resp.json().await.map_err(AuthError::NetworkError)?;
        Ok(user.into())
    }

    /// Exchange a refresh token for a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the refresh token is rejected.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let resp = check_response(resp)
            .await
            .map_err(|f| map_auth_failure(&f, ""))?;
        resp.json::<AuthSession>()
            .await
            .map_err(AuthError::NetworkError)
    }

    /// URL to send the browser to for a redirect-based OAuth sign-in.
    #[must_use]
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> String {
        format!(
            "{}/auth/v1/authorize?provider={}&redirect_to={}",
            self.base_url(),
            provider.as_str(),
            urlencoding::encode(redirect_to)
        )
    }

    fn http_get_with_bearer(&self, url: &str, token: &str) -> reqwest::RequestBuilder {
        // current_user authenticates as the passed token, not the shared one.
        self.request(reqwest::Method::GET, url.to_string())
            .bearer_auth(token)
    }
}

/// Map a provider failure body onto the auth taxonomy.
///
/// The provider reports both bad passwords and unverified accounts as 400s;
/// only the message distinguishes them, so the match is on the description.
fn map_auth_failure(failure: &ApiFailure, email: &str) -> AuthError {
    let description = failure.description();
    if description.contains("Invalid login credentials") {
        return AuthError::InvalidCredentials;
    }
    if description.contains("Email not confirmed") {
        return AuthError::EmailNotConfirmed {
            email: email.to_string(),
        };
    }
    AuthError::ProviderError {
        status: failure.status,
        message: description,
    }
}
