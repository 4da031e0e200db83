//! Auth orchestration state machine.
//!
//! Coordinates the identity bridge, the profile resolver and the session
//! store into one consistent view, and drives the one-shot post-sign-in
//! navigation decision.
//!
//! ```text
//! Bootstrapping ──► Unauthenticated ──► ResolvingProfile ──► AuthenticatedComplete
//!       │                  ▲                                 AuthenticatedIncomplete
//!       └──────────────────┴──────────────── sign-out ◄──────────────┘
//! ```
//!
//! Three guards keep the machine well-behaved under racing deliveries:
//! - idempotent apply: a monotonic last-navigated identity token means the
//!   same sign-in applied twice (bootstrap + first stream event) navigates
//!   at most once;
//! - stale-response guard: a generation counter bumped on sign-out makes a
//!   late profile-fetch result for a since-signed-out user a no-op; one
//!   mutex is held from the generation re-check through the session install,
//!   and sign-out mutates under the same mutex, so a sign-out landing while
//!   a result is being installed can never be overwritten by it;
//! - re-entrancy guard: an in-flight flag drops overlapping sign-in
//!   deliveries instead of double-resolving.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use tw_backend::AuthError;
use tw_core::profile::Role;
use tw_core::Identity;

use crate::events::AuthEvent;
use crate::navigation::{navigation_intent, Navigator};
use crate::resolver::ResolveProfile;
use crate::session::SessionStore;

/// Orchestrator state, readable by the hosting application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Bootstrapping,
    Unauthenticated,
    ResolvingProfile,
    AuthenticatedIncomplete,
    AuthenticatedComplete,
}

impl AuthState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrapping => "bootstrapping",
            Self::Unauthenticated => "unauthenticated",
            Self::ResolvingProfile => "resolving_profile",
            Self::AuthenticatedIncomplete => "authenticated_incomplete",
            Self::AuthenticatedComplete => "authenticated_complete",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct AuthOrchestrator<R, N> {
    session: Arc<SessionStore>,
    resolver: R,
    navigator: N,
    state: watch::Sender<AuthState>,
    /// Re-entrancy guard for overlapping sign-in deliveries.
    in_flight: AtomicBool,
    /// Serializes session installation against sign-out.
    guard: Mutex<ApplyGuard>,
    bootstrap_timeout: Duration,
}

/// State the install path and the sign-out path contend on. Both paths take
/// the one mutex wrapping it, so the generation check and the session
/// mutation it protects are atomic with respect to sign-out.
#[derive(Debug, Default)]
struct ApplyGuard {
    /// Bumped on every sign-out; the stale-response guard.
    generation: u64,
    /// Identity id a navigation decision was already applied for.
    last_navigated: Option<String>,
}

impl<R, N> AuthOrchestrator<R, N>
where
    R: ResolveProfile,
    N: Navigator,
{
    #[must_use]
    pub fn new(
        session: Arc<SessionStore>,
        resolver: R,
        navigator: N,
        bootstrap_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Bootstrapping);
        Self {
            session,
            resolver,
            navigator,
            state,
            in_flight: AtomicBool::new(false),
            guard: Mutex::new(ApplyGuard::default()),
            bootstrap_timeout,
        }
    }

    /// Current machine state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Subscribe to machine state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Bootstrap the persisted session, then consume the auth-change stream
    /// until it closes.
    ///
    /// `events` must have been subscribed before `bootstrap` was started so
    /// no event delivered during bootstrap is lost; bootstrap and the first
    /// stream event may carry the same identity and are applied
    /// idempotently.
    pub async fn run(
        &self,
        mut events: broadcast::Receiver<AuthEvent>,
        bootstrap: impl Future<Output = Result<Option<Identity>, AuthError>> + Send,
    ) {
        self.bootstrap(bootstrap).await;

        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }

    /// Recover the persisted session, with an explicit timeout so a provider
    /// that never responds cannot leave the UI stuck loading.
    async fn bootstrap(
        &self,
        bootstrap: impl Future<Output = Result<Option<Identity>, AuthError>> + Send,
    ) {
        self.state.send_replace(AuthState::Bootstrapping);
        self.session.set_loading(true);

        match tokio::time::timeout(self.bootstrap_timeout, bootstrap).await {
            Ok(Ok(Some(identity))) => self.apply_signed_in(identity).await,
            Ok(Ok(None)) => self.settle_unauthenticated(),
            Ok(Err(error)) => {
                tracing::warn!(%error, "session bootstrap failed");
                self.settle_unauthenticated();
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.bootstrap_timeout.as_secs(),
                    "session bootstrap timed out; treating as signed out"
                );
                self.settle_unauthenticated();
            }
        }
    }

    /// Dispatch one auth-change event.
    pub async fn handle_event(&self, event: AuthEvent) {
        tracing::debug!(
            kind = event.kind(),
            identity = event.identity().map(|i| i.id.as_str()),
            "auth event"
        );
        match event {
            AuthEvent::SignedIn(identity) => self.apply_signed_in(identity).await,
            AuthEvent::SignedOut => self.apply_signed_out(),
            AuthEvent::TokenRefreshed(identity) | AuthEvent::UserUpdated(identity) => {
                // Refresh the identity copy, but only while that user is
                // still the session's — a late refresh after sign-out is stale.
                let current = self.session.snapshot();
                if current.identity.as_ref().is_some_and(|i| i.id == identity.id) {
                    self.session.set_identity(Some(identity));
                }
            }
        }
    }

    /// Apply a sign-in: resolve the profile, install the session, and apply
    /// at most one navigation decision for this identity.
    pub async fn apply_signed_in(&self, identity: Identity) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(identity = %identity.id, "overlapping sign-in delivery ignored");
            return;
        }
        let _reset = InFlightReset(&self.in_flight);

        self.session.set_loading(true);
        self.state.send_replace(AuthState::ResolvingProfile);

        let generation = self.guard.lock().expect("apply guard poisoned").generation;
        let result = self.resolver.resolve(&identity.id).await;

        // Stale-response guard. The lock is held from the re-check through
        // the install below, so a racing sign-out either bumped the
        // generation first (the result is discarded) or waits and clears the
        // session afterwards — a late result can never overwrite it.
        let mut guard = self.guard.lock().expect("apply guard poisoned");
        if guard.generation != generation {
            tracing::debug!(identity = %identity.id, "discarding stale profile result");
            return;
        }

        let (profile, profile_error) = match result {
            Ok(profile) => (profile, false),
            Err(error) => {
                tracing::warn!(identity = %identity.id, %error,
                    "profile fetch failed; treating profile as incomplete");
                (None, true)
            }
        };

        self.session.set_profile_error(profile_error);
        self.session
            .set_authenticated(identity.clone(), profile.clone());

        self.state.send_replace(if self.session.snapshot().profile_complete() {
            AuthState::AuthenticatedComplete
        } else {
            AuthState::AuthenticatedIncomplete
        });

        if guard.last_navigated.as_deref() == Some(identity.id.as_str()) {
            return; // same tuple applied twice; never navigate again
        }
        guard.last_navigated = Some(identity.id.clone());

        let role_hint = profile
            .as_ref()
            .and_then(|p| p.role)
            .or_else(|| identity.metadata_str("role").and_then(Role::parse));
        let route = self.navigator.current_route();
        if let Some(intent) = navigation_intent(profile.as_ref(), role_hint, &route) {
            tracing::info!(from = %route, to = %intent.to, "post-sign-in navigation");
            self.navigator.navigate(&intent);
        }
    }

    /// Apply a sign-out: clear the session in one update. No navigation is
    /// computed here — navigation on sign-out is the caller's explicit
    /// responsibility.
    pub fn apply_signed_out(&self) {
        let mut guard = self.guard.lock().expect("apply guard poisoned");
        guard.generation += 1;
        guard.last_navigated = None;
        self.session.clear();
        self.state.send_replace(AuthState::Unauthenticated);
    }

    fn settle_unauthenticated(&self) {
        self.session.set_loading(false);
        self.state.send_replace(AuthState::Unauthenticated);
    }
}

struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;
    use tw_backend::FetchError;
    use tw_core::profile::Profile;
    use tw_core::routes::paths;

    use crate::navigation::NavigationIntent;

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.into(),
            email: format!("{id}@example.com"),
            metadata: serde_json::Map::new(),
        }
    }

    fn complete_profile(id: &str, role: Role) -> Profile {
        Profile {
            id: id.into(),
            full_name: Some("Jane Roe".into()),
            role: Some(role),
            ..Profile::default()
        }
    }

    // -- test doubles -------------------------------------------------------

    #[derive(Clone)]
    struct StaticResolver(Result<Option<Profile>, ()>);

    impl ResolveProfile for StaticResolver {
        async fn resolve(&self, _: &str) -> Result<Option<Profile>, FetchError> {
            match &self.0 {
                Ok(profile) => Ok(profile.clone()),
                Err(()) => Err(FetchError::Decode("synthetic failure".into())),
            }
        }
    }

    /// Resolver that blocks until released, for interleaving tests.
    #[derive(Clone)]
    struct GatedResolver {
        gate: Arc<Notify>,
        profile: Option<Profile>,
    }

    impl ResolveProfile for GatedResolver {
        async fn resolve(&self, _: &str) -> Result<Option<Profile>, FetchError> {
            self.gate.notified().await;
            Ok(self.profile.clone())
        }
    }

    /// Resolver with a two-way handshake: signals when the fetch is in
    /// flight, then blocks until released.
    #[derive(Clone)]
    struct HandshakeResolver {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        profile: Option<Profile>,
    }

    impl ResolveProfile for HandshakeResolver {
        async fn resolve(&self, _: &str) -> Result<Option<Profile>, FetchError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.profile.clone())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNavigator {
        inner: Arc<NavigatorInner>,
    }

    #[derive(Default)]
    struct NavigatorInner {
        route: Mutex<String>,
        navigations: Mutex<Vec<NavigationIntent>>,
    }

    impl RecordingNavigator {
        fn at(route: &str) -> Self {
            let nav = Self::default();
            *nav.inner.route.lock().unwrap() = route.to_string();
            nav
        }

        fn navigations(&self) -> Vec<NavigationIntent> {
            self.inner.navigations.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn current_route(&self) -> String {
            self.inner.route.lock().unwrap().clone()
        }

        fn navigate(&self, intent: &NavigationIntent) {
            let mut route = self.inner.route.lock().unwrap();
            *route = intent.to.clone();
            self.inner.navigations.lock().unwrap().push(intent.clone());
        }
    }

    fn orchestrator<R: ResolveProfile>(
        resolver: R,
        navigator: RecordingNavigator,
    ) -> AuthOrchestrator<R, RecordingNavigator> {
        AuthOrchestrator::new(
            Arc::new(SessionStore::new()),
            resolver,
            navigator,
            Duration::from_secs(5),
        )
    }

    // -- bootstrap ----------------------------------------------------------

    #[tokio::test]
    async fn bootstrap_without_session_settles_unauthenticated() {
        let orch = orchestrator(StaticResolver(Ok(None)), RecordingNavigator::at("/"));
        orch.bootstrap(async { Ok(None) }).await;

        assert_eq!(orch.state(), AuthState::Unauthenticated);
        let session = orch.session.snapshot();
        assert!(session.identity.is_none());
        assert!(!session.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn bootstrap_timeout_falls_back_to_unauthenticated() {
        let orch = orchestrator(StaticResolver(Ok(None)), RecordingNavigator::at("/"));
        orch.bootstrap(std::future::pending()).await;

        assert_eq!(orch.state(), AuthState::Unauthenticated);
        assert!(!orch.session.snapshot().loading);
    }

    #[tokio::test]
    async fn bootstrap_with_identity_resolves_and_navigates() {
        let profile = complete_profile("u-1", Role::Admin);
        let navigator = RecordingNavigator::at("/");
        let orch = orchestrator(StaticResolver(Ok(Some(profile))), navigator.clone());
        orch.bootstrap(async { Ok(Some(identity("u-1"))) }).await;

        assert_eq!(orch.state(), AuthState::AuthenticatedComplete);
        assert_eq!(
            navigator.navigations(),
            vec![NavigationIntent {
                to: paths::ADMIN_HOME.to_string(),
                replace: true,
            }]
        );
    }

    // -- sign-in semantics --------------------------------------------------

    #[tokio::test]
    async fn signed_in_with_incomplete_profile_routes_to_completion() {
        let navigator = RecordingNavigator::at("/dashboard");
        let orch = orchestrator(StaticResolver(Ok(None)), navigator.clone());
        orch.apply_signed_in(identity("u-1")).await;

        assert_eq!(orch.state(), AuthState::AuthenticatedIncomplete);
        let session = orch.session.snapshot();
        assert!(session.identity.is_some());
        assert!(session.profile.is_none());
        assert!(!session.loading);
        assert_eq!(navigator.navigations()[0].to, "/complete-profile");
    }

    #[tokio::test]
    async fn profile_fetch_failure_degrades_to_incomplete() {
        let navigator = RecordingNavigator::at("/login");
        let orch = orchestrator(StaticResolver(Err(())), navigator.clone());
        orch.apply_signed_in(identity("u-1")).await;

        assert_eq!(orch.state(), AuthState::AuthenticatedIncomplete);
        let session = orch.session.snapshot();
        assert!(session.identity.is_some(), "identity survives fetch failure");
        assert!(session.profile.is_none());
        assert!(session.profile_error);
        assert!(!session.loading, "loading must clear even on failure");
    }

    #[tokio::test]
    async fn applying_same_identity_twice_navigates_once() {
        let profile = complete_profile("u-1", Role::Manufacturer);
        let navigator = RecordingNavigator::at("/login");
        let orch = orchestrator(StaticResolver(Ok(Some(profile))), navigator.clone());

        orch.apply_signed_in(identity("u-1")).await;
        let after_first = orch.session.snapshot();
        orch.apply_signed_in(identity("u-1")).await;

        assert_eq!(orch.session.snapshot(), after_first, "idempotent apply");
        assert_eq!(navigator.navigations().len(), 1, "at most one navigation");
    }

    #[tokio::test]
    async fn sign_out_then_sign_in_navigates_again() {
        let profile = complete_profile("u-1", Role::Client);
        let navigator = RecordingNavigator::at("/login");
        let orch = orchestrator(StaticResolver(Ok(Some(profile))), navigator.clone());

        orch.apply_signed_in(identity("u-1")).await;
        orch.apply_signed_out();
        // back on the login page after the caller's own redirect
        *navigator.inner.route.lock().unwrap() = "/login".into();
        orch.apply_signed_in(identity("u-1")).await;

        assert_eq!(navigator.navigations().len(), 2);
        assert_eq!(orch.state(), AuthState::AuthenticatedComplete);
    }

    #[tokio::test]
    async fn stale_profile_result_does_not_repopulate_cleared_session() {
        let gate = Arc::new(Notify::new());
        let resolver = GatedResolver {
            gate: gate.clone(),
            profile: Some(complete_profile("u-1", Role::Client)),
        };
        let navigator = RecordingNavigator::at("/login");
        let orch = Arc::new(orchestrator(resolver, navigator.clone()));

        let task = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.apply_signed_in(identity("u-1")).await })
        };
        tokio::task::yield_now().await;

        // user signs out while the profile fetch is still in flight
        orch.apply_signed_out();
        gate.notify_one();
        task.await.expect("apply task");

        let session = orch.session.snapshot();
        assert!(session.identity.is_none(), "session must stay cleared");
        assert!(session.profile.is_none());
        assert_eq!(orch.state(), AuthState::Unauthenticated);
        assert!(navigator.navigations().is_empty(), "no navigation for stale result");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sign_out_racing_profile_install_never_repopulates_session() {
        // The sign-out fires from another worker thread exactly as the
        // resolver releases the in-flight fetch. Whichever side takes the
        // apply lock first, the session must end cleared.
        for _ in 0..200 {
            let entered = Arc::new(Notify::new());
            let release = Arc::new(Notify::new());
            let resolver = HandshakeResolver {
                entered: entered.clone(),
                release: release.clone(),
                profile: Some(complete_profile("u-1", Role::Client)),
            };
            let orch = Arc::new(orchestrator(resolver, RecordingNavigator::at("/login")));

            let apply = {
                let orch = orch.clone();
                tokio::spawn(async move { orch.apply_signed_in(identity("u-1")).await })
            };
            entered.notified().await; // fetch is in flight now

            let sign_out = {
                let orch = orch.clone();
                tokio::spawn(async move { orch.apply_signed_out() })
            };
            release.notify_one();

            apply.await.expect("apply task");
            sign_out.await.expect("sign-out task");

            let session = orch.session.snapshot();
            assert!(session.identity.is_none(), "sign-out must win the install race");
            assert!(session.profile.is_none());
        }
    }

    #[tokio::test]
    async fn sign_out_clears_without_navigating() {
        let profile = complete_profile("u-1", Role::Client);
        let navigator = RecordingNavigator::at("/");
        let orch = orchestrator(StaticResolver(Ok(Some(profile))), navigator.clone());

        orch.apply_signed_in(identity("u-1")).await;
        let navigations_before = navigator.navigations().len();
        orch.apply_signed_out();

        assert_eq!(orch.session.snapshot(), Default::default());
        assert_eq!(navigator.navigations().len(), navigations_before);
    }

    // -- event loop ---------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn bootstrap_and_first_stream_event_navigate_once() {
        let profile = complete_profile("u-1", Role::Admin);
        let navigator = RecordingNavigator::at("/");
        let orch = Arc::new(orchestrator(
            StaticResolver(Ok(Some(profile))),
            navigator.clone(),
        ));

        let (tx, rx) = broadcast::channel(4);
        // the bridge emits the recovered session on the stream too
        tx.send(AuthEvent::SignedIn(identity("u-1"))).unwrap();

        let run = {
            let orch = orch.clone();
            tokio::spawn(async move {
                orch.run(rx, async { Ok(Some(identity("u-1"))) }).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx); // close the stream so run() returns
        run.await.expect("run task");

        assert_eq!(navigator.navigations().len(), 1, "no double navigation");
        assert_eq!(orch.state(), AuthState::AuthenticatedComplete);
    }

    #[tokio::test(start_paused = true)]
    async fn signed_out_event_clears_session() {
        let profile = complete_profile("u-1", Role::Client);
        let navigator = RecordingNavigator::at("/login");
        let orch = Arc::new(orchestrator(
            StaticResolver(Ok(Some(profile))),
            navigator.clone(),
        ));

        let (tx, rx) = broadcast::channel(4);
        tx.send(AuthEvent::SignedIn(identity("u-1"))).unwrap();
        tx.send(AuthEvent::SignedOut).unwrap();

        let run = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run(rx, async { Ok(None) }).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx);
        run.await.expect("run task");

        let session = orch.session.snapshot();
        assert!(session.identity.is_none());
        assert!(session.profile.is_none());
        assert_eq!(orch.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn late_token_refresh_after_sign_out_is_ignored() {
        let orch = orchestrator(StaticResolver(Ok(None)), RecordingNavigator::at("/"));
        orch.apply_signed_in(identity("u-1")).await;
        orch.apply_signed_out();

        orch.handle_event(AuthEvent::TokenRefreshed(identity("u-1"))).await;

        assert!(orch.session.snapshot().identity.is_none());
    }
}
