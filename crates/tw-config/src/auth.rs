//! Authentication flow configuration.

use serde::{Deserialize, Serialize};

const fn default_bootstrap_timeout() -> u64 {
    10
}

const fn default_oauth_callback_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Seconds to wait for session bootstrap before falling back to
    /// unauthenticated. Guards against the UI hanging in a loading state
    /// when the provider never responds.
    #[serde(default = "default_bootstrap_timeout")]
    pub bootstrap_timeout_secs: u64,

    /// Seconds to wait for the OAuth browser redirect to hit the loopback
    /// callback listener.
    #[serde(default = "default_oauth_callback_timeout")]
    pub oauth_callback_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bootstrap_timeout_secs: default_bootstrap_timeout(),
            oauth_callback_timeout_secs: default_oauth_callback_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = AuthConfig::default();
        assert_eq!(config.bootstrap_timeout_secs, 10);
        assert_eq!(config.oauth_callback_timeout_secs, 300);
    }
}
