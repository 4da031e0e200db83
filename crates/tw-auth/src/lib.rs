//! # tw-auth
//!
//! Session, identity-provider bridge and auth orchestration for Tradewind.
//!
//! Provides the session store (single source of truth for identity +
//! profile + loading), the bridge over the hosted identity service, the
//! profile resolver, the auth orchestration state machine, post-sign-in
//! navigation, and the role-based route gate.

pub mod bridge;
pub mod events;
pub mod gate;
pub mod navigation;
pub mod orchestrator;
pub mod resolver;
pub mod session;

pub use bridge::IdentityBridge;
pub use events::AuthEvent;
pub use gate::visible_routes;
pub use navigation::{NavigationIntent, Navigator, navigation_intent};
pub use orchestrator::{AuthOrchestrator, AuthState};
pub use resolver::{ProfileResolver, ResolveProfile};
pub use session::SessionStore;

use std::sync::Arc;
use std::time::Duration;

use tw_backend::{AuthError, BackendClient, OAuthProvider};
use tw_config::AuthConfig;
use tw_core::Identity;

/// The wired-up auth subsystem, owned by the hosting application.
///
/// [`AuthRuntime::start`] is the init hook: it subscribes to the auth-change
/// stream *before* kicking off session bootstrap (so no event is lost) and
/// spawns the orchestrator loop. [`AuthRuntime::shutdown`] is the teardown
/// hook.
pub struct AuthRuntime<N: Navigator> {
    session: Arc<SessionStore>,
    bridge: Arc<IdentityBridge>,
    orchestrator: Arc<AuthOrchestrator<ProfileResolver, N>>,
    task: tokio::task::JoinHandle<()>,
}

impl<N: Navigator + 'static> AuthRuntime<N> {
    /// Wire the subsystem and start bootstrap + event consumption.
    #[must_use]
    pub fn start(backend: BackendClient, config: &AuthConfig, navigator: N) -> Self {
        let session = Arc::new(SessionStore::new());
        let bridge = Arc::new(IdentityBridge::new(backend.clone(), config));
        let orchestrator = Arc::new(AuthOrchestrator::new(
            session.clone(),
            ProfileResolver::new(backend),
            navigator,
            Duration::from_secs(config.bootstrap_timeout_secs),
        ));

        // Subscribe first; bootstrap races the first stream event and the
        // orchestrator applies whichever lands first idempotently.
        let events = bridge.subscribe();
        let task = {
            let orchestrator = orchestrator.clone();
            let bridge = bridge.clone();
            tokio::spawn(async move {
                orchestrator
                    .run(events, async move { bridge.bootstrap_session().await })
                    .await;
            })
        };

        Self {
            session,
            bridge,
            orchestrator,
            task,
        }
    }

    /// The session store, for the route gate and feature code.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Current orchestrator state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.orchestrator.state()
    }

    /// Sign in with email and password.
    ///
    /// State transitions happen through the event stream, not here; this
    /// wrapper only surfaces the user-facing outcome.
    ///
    /// # Errors
    ///
    /// [`AuthError::EmailNotConfirmed`] carries the attempted email so the
    /// caller can offer a resend-confirmation action; see
    /// [`Self::resend_confirmation`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.bridge.sign_in(email, password).await
    }

    /// Create an account with a sign-up metadata bag (proposed full name,
    /// company, role hint).
    ///
    /// `Ok(None)` means the provider wants email confirmation first — tell
    /// the user to check their inbox.
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
        self.bridge.sign_up(email, password, metadata).await
    }

    /// Start a redirect-based OAuth sign-in. The outcome arrives later as a
    /// stream event.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::OAuthFlowFailed`] if the redirect could not be
    /// initiated.
    pub fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), AuthError> {
        self.bridge.sign_in_with_oauth(provider)
    }

    /// Sign out. Navigation after sign-out is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejected the logout; the local
    /// session is cleared regardless.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.bridge.sign_out().await
    }

    /// Re-send the sign-up confirmation email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider rejects the resend call.
    pub async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError> {
        self.bridge.resend_confirmation(email).await
    }

    /// Tear down the orchestrator loop.
    pub fn shutdown(self) {
        self.task.abort();
    }
}
