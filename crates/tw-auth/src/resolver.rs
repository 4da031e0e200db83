//! Profile resolution — one keyed lookup against the `profiles` table.

use tw_backend::{BackendClient, FetchError, Filter};
use tw_core::Profile;

/// Seam the orchestrator resolves profiles through; tests substitute fakes.
pub trait ResolveProfile: Send + Sync {
    /// Fetch the profile for `identity_id`.
    ///
    /// `Ok(None)` means "no profile row exists yet" — not an error; the
    /// orchestrator treats it like an incomplete profile.
    fn resolve(
        &self,
        identity_id: &str,
    ) -> impl Future<Output = Result<Option<Profile>, FetchError>> + Send;
}

/// The production resolver. No retries, no caching — each call hits the
/// hosted store; the session store is the only cache.
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    backend: BackendClient,
}

impl ProfileResolver {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

impl ResolveProfile for ProfileResolver {
    async fn resolve(&self, identity_id: &str) -> Result<Option<Profile>, FetchError> {
        self.backend
            .select_one("profiles", &Filter::new().eq("id", identity_id))
            .await
    }
}
