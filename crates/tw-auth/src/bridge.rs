//! Identity provider bridge.
//!
//! Adapts the hosted identity service into the two primitives the
//! orchestrator needs: a broadcast stream of [`AuthEvent`]s and the
//! request/response operations (sign-in, sign-out, OAuth, confirmation
//! resend, session bootstrap). The bridge owns the token lifecycle: it
//! persists the token pair, installs the access token on the shared backend
//! client, and runs the background refresh task that keeps a session alive.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use tw_backend::session_store::{self, StoredSession};
use tw_backend::{AuthError, AuthSession, BackendClient, OAuthProvider, jwt};
use tw_config::AuthConfig;
use tw_core::Identity;

use crate::events::AuthEvent;

/// Refresh this many seconds before the access token expires.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Retry delay after a transient refresh failure.
const REFRESH_RETRY: Duration = Duration::from_secs(30);

pub struct IdentityBridge {
    backend: BackendClient,
    events: broadcast::Sender<AuthEvent>,
    oauth_callback_timeout: Duration,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl IdentityBridge {
    #[must_use]
    pub fn new(backend: BackendClient, config: &AuthConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            backend,
            events,
            oauth_callback_timeout: Duration::from_secs(config.oauth_callback_timeout_secs),
            refresh_task: Mutex::new(None),
        }
    }

    /// Subscribe to the auth-change event stream.
    ///
    /// Subscribe before calling [`Self::bootstrap_session`] so no event
    /// delivered during bootstrap is lost.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Sign in with email and password.
    ///
    /// On success the session is persisted, the backend client authenticates
    /// as the user, and a `SignedIn` event is emitted on the stream.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for a rejected password.
    /// - [`AuthError::EmailNotConfirmed`] for an unverified account — surface
    ///   with a resend-confirmation affordance.
    /// - [`AuthError::ProviderError`] / [`AuthError::NetworkError`] otherwise.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let session = self.backend.sign_in_with_password(email, password).await?;
        let identity = self.install(&session);
        let _ = self.events.send(AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Create an account. `metadata` is the sign-up bag (proposed full name,
    /// company, role hint) stored on the identity for later pre-fill.
    ///
    /// Returns `Ok(None)` when the provider requires email confirmation — no
    /// session exists yet and the caller should tell the user to check their
    /// inbox. When confirmation is disabled the session is installed
    /// immediately and a `SignedIn` event is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the sign-up.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Option<Identity>, AuthError> {
        match self.backend.sign_up(email, password, metadata).await? {
            Some(session) => {
                let identity = self.install(&session);
                let _ = self.events.send(AuthEvent::SignedIn(identity.clone()));
                Ok(Some(identity))
            }
            None => Ok(None),
        }
    }

    /// Start a redirect-based OAuth sign-in.
    ///
    /// Binds a loopback callback listener, opens the system browser at the
    /// provider's authorize URL, and returns as soon as the redirect is
    /// initiated. The eventual outcome arrives later as a `SignedIn` event
    /// (or not at all, if the user abandons the browser flow).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::OAuthFlowFailed`] if the listener cannot bind or
    /// the CSRF nonce cannot be generated.
    pub fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), AuthError> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|e| AuthError::OAuthFlowFailed(format!("failed to bind: {e}")))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .ok_or_else(|| AuthError::OAuthFlowFailed("no port".into()))?;

        // Random 16-byte hex state nonce for CSRF protection
        let mut nonce_bytes = [0u8; 16];
        getrandom::fill(&mut nonce_bytes)
            .map_err(|e| AuthError::OAuthFlowFailed(format!("nonce generation: {e}")))?;
        let state: String = nonce_bytes.iter().map(|b| format!("{b:02x}")).collect();

        let redirect_url = format!("http://127.0.0.1:{port}/callback?state={state}");
        let authorize_url = self.backend.authorize_url(provider, &redirect_url);

        if let Err(error) = open::that(&authorize_url) {
            tracing::warn!(%error, "failed to open browser; flow must be completed manually");
        }

        let backend = self.backend.clone();
        let events = self.events.clone();
        let timeout = self.oauth_callback_timeout;
        tokio::spawn(async move {
            let tokens =
                tokio::task::spawn_blocking(move || wait_for_callback(server, timeout, state))
                    .await;
            let session = match tokens {
                Ok(Ok(session)) => session,
                Ok(Err(error)) => {
                    tracing::warn!(%error, "OAuth callback failed");
                    return;
                }
                Err(error) => {
                    tracing::warn!(%error, "OAuth callback task join failed");
                    return;
                }
            };
            match backend.current_user(&session.access_token).await {
                Ok(identity) => {
                    backend.set_bearer(Some(session.access_token.clone()));
                    if let Err(error) = session_store::store(&session) {
                        tracing::warn!(%error, "failed to persist OAuth session");
                    }
                    let _ = events.send(AuthEvent::SignedIn(identity));
                }
                Err(error) => {
                    tracing::warn!(%error, "OAuth token rejected by provider");
                }
            }
        });

        Ok(())
    }

    /// Sign out at the provider and locally.
    ///
    /// Local cleanup (persisted session, bearer token, refresh task) always
    /// runs and a `SignedOut` event is always emitted, even when the
    /// provider call fails — the caller may surface the error, but the
    /// process-local session is gone either way.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the logout call.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.backend.sign_out().await;

        self.abort_refresh();
        if let Err(error) = session_store::delete() {
            tracing::warn!(%error, "failed to delete persisted session");
        }
        self.backend.set_bearer(None);
        let _ = self.events.send(AuthEvent::SignedOut);

        result
    }

    /// Re-send the sign-up confirmation email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the resend call.
    pub async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError> {
        self.backend.resend_confirmation(email).await
    }

    /// Recover a persisted session. Called exactly once at process start,
    /// after subscribing to the event stream.
    ///
    /// Returns `Ok(None)` when no session is persisted or the persisted
    /// tokens were rejected (stale session). On recovery the `SignedIn`
    /// event is also emitted, racing the caller's own handling of the
    /// returned identity — consumers apply idempotently.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NetworkError`] when the provider was unreachable,
    /// so callers can distinguish "no session" from "could not check".
    pub async fn bootstrap_session(&self) -> Result<Option<Identity>, AuthError> {
        let Some(stored) = session_store::load() else {
            return Ok(None);
        };

        // The persisted access token is usually expired; go straight to the
        // refresh grant.
        match self.backend.refresh_session(&stored.refresh_token).await {
            Ok(session) => {
                let identity = self.install(&session);
                let _ = self.events.send(AuthEvent::SignedIn(identity.clone()));
                Ok(Some(identity))
            }
            Err(AuthError::NetworkError(e)) => Err(AuthError::NetworkError(e)),
            Err(error) => {
                tracing::info!(%error, "persisted session rejected; clearing");
                if let Err(error) = session_store::delete() {
                    tracing::warn!(%error, "failed to delete stale session");
                }
                Ok(None)
            }
        }
    }

    /// Install a fresh provider session: bearer token, persistence, refresh
    /// task. Returns the identity it authenticates.
    fn install(&self, session: &AuthSession) -> Identity {
        let identity = session.to_identity();
        let stored = StoredSession {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
        };
        self.backend.set_bearer(Some(stored.access_token.clone()));
        if let Err(error) = session_store::store(&stored) {
            tracing::warn!(%error, "failed to persist session");
        }
        self.spawn_refresh(stored, session.expires_at());
        identity
    }

    fn spawn_refresh(&self, session: StoredSession, expires_at: Option<chrono::DateTime<chrono::Utc>>) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(refresh_loop(backend, events, session, expires_at));
        let mut slot = self.refresh_task.lock().expect("refresh slot poisoned");
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn abort_refresh(&self) {
        let mut slot = self.refresh_task.lock().expect("refresh slot poisoned");
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

/// Keep the session alive: sleep until shortly before expiry, run the
/// refresh grant, emit `TokenRefreshed`. A rejected refresh means the
/// provider revoked the session — clean up and emit `SignedOut`.
///
/// The provider's `expires_in` hint is authoritative when present; decoding
/// the token's `exp` claim is the fallback for sessions recovered without it.
async fn refresh_loop(
    backend: BackendClient,
    events: broadcast::Sender<AuthEvent>,
    mut session: StoredSession,
    mut expires_at: Option<chrono::DateTime<chrono::Utc>>,
) {
    loop {
        let expiry = expires_at.or_else(|| jwt::decode_expiry(&session.access_token).ok());
        let delay = expiry.map_or(Duration::from_secs(3600), |expires_at| {
            let wake = expires_at - chrono::Duration::seconds(EXPIRY_BUFFER_SECS);
            (wake - chrono::Utc::now()).to_std().unwrap_or_default()
        });
        tokio::time::sleep(delay).await;

        match backend.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                let identity = fresh.to_identity();
                let stored = StoredSession {
                    access_token: fresh.access_token.clone(),
                    refresh_token: fresh.refresh_token.clone(),
                };
                backend.set_bearer(Some(stored.access_token.clone()));
                if let Err(error) = session_store::store(&stored) {
                    tracing::warn!(%error, "failed to persist refreshed session");
                }
                session = stored;
                expires_at = fresh.expires_at();
                let _ = events.send(AuthEvent::TokenRefreshed(identity));
            }
            Err(AuthError::NetworkError(error)) => {
                tracing::warn!(%error, "token refresh unreachable; retrying");
                tokio::time::sleep(REFRESH_RETRY).await;
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh rejected; signing out");
                if let Err(error) = session_store::delete() {
                    tracing::warn!(%error, "failed to delete revoked session");
                }
                backend.set_bearer(None);
                let _ = events.send(AuthEvent::SignedOut);
                return;
            }
        }
    }
}

/// Block until the callback server receives the provider redirect.
///
/// Loops on `recv_timeout()`, ignoring requests that don't match
/// `/callback?` (favicon, preflight, user refreshes).
fn wait_for_callback(
    server: tiny_http::Server,
    timeout: Duration,
    expected_state: String,
) -> Result<StoredSession, AuthError> {
    let deadline = std::time::Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        if remaining.is_zero() {
            return Err(AuthError::OAuthFlowFailed(format!(
                "callback timed out after {}s",
                timeout.as_secs()
            )));
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(req)) => req,
            Ok(None) => {
                return Err(AuthError::OAuthFlowFailed(format!(
                    "callback timed out after {}s",
                    timeout.as_secs()
                )));
            }
            Err(e) => return Err(AuthError::OAuthFlowFailed(format!("recv error: {e}"))),
        };

        let url = request.url().to_string();
        if !url.starts_with("/callback?") {
            let response = tiny_http::Response::from_string("").with_status_code(204);
            let _ = request.respond(response);
            continue;
        }

        let Some(query) = url.split('?').nth(1) else {
            respond_html(request, "Sign-in failed: no query string in callback.");
            return Err(AuthError::OAuthFlowFailed("no query string".into()));
        };

        match parse_callback_query(query) {
            Ok(callback) => {
                if callback.state.as_deref() != Some(expected_state.as_str()) {
                    respond_html(request, "Sign-in failed: state mismatch.");
                    return Err(AuthError::OAuthFlowFailed(
                        "state mismatch — possible CSRF".into(),
                    ));
                }
                match callback.into_session() {
                    Some(session) => {
                        respond_html(request, "Signed in. You can close this tab.");
                        return Ok(session);
                    }
                    None => {
                        // The provider delivers tokens in the URL fragment,
                        // which never reaches the server. Serve a shim that
                        // re-requests with the fragment folded into the query.
                        respond_fragment_shim(request);
                    }
                }
            }
            Err(error) => {
                respond_html(request, "Sign-in failed: malformed callback.");
                return Err(error);
            }
        }
    }
}

#[derive(Debug, Default)]
struct CallbackQuery {
    access_token: Option<String>,
    refresh_token: Option<String>,
    state: Option<String>,
}

impl CallbackQuery {
    fn into_session(self) -> Option<StoredSession> {
        Some(StoredSession {
            access_token: self.access_token?,
            refresh_token: self.refresh_token?,
        })
    }
}

fn parse_callback_query(query: &str) -> Result<CallbackQuery, AuthError> {
    let mut parsed = CallbackQuery::default();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value)
            .map_err(|e| AuthError::OAuthFlowFailed(format!("URL decode: {e}")))?
            .into_owned();
        match key {
            "access_token" => parsed.access_token = Some(value),
            "refresh_token" => parsed.refresh_token = Some(value),
            "state" => parsed.state = Some(value),
            _ => {}
        }
    }
    Ok(parsed)
}

fn respond_fragment_shim(request: tiny_http::Request) {
    let page = "<html><body><p>Completing sign-in, please wait.</p><script>\
        if (window.location.hash.length > 1) {\
            window.location.replace('/callback' + window.location.search + '&' + window.location.hash.substring(1));\
        }\
        </script></body></html>";
    let response = tiny_http::Response::from_string(page).with_header(
        tiny_http::Header::from_bytes("Content-Type", "text/html").expect("valid header"),
    );
    let _ = request.respond(response);
}

fn respond_html(request: tiny_http::Request, body: &str) {
    let response = tiny_http::Response::from_string(format!(
        "<html><body><p>{body}</p></body></html>"
    ))
    .with_header(tiny_http::Header::from_bytes("Content-Type", "text/html").expect("valid header"));
    let _ = request.respond(response);
}
