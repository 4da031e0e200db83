//! # tw-config
//!
//! Layered configuration loading for Tradewind using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TRADEWIND_*` prefix, `__` as separator)
//! 2. Project-level `.tradewind/config.toml`
//! 3. User-level `~/.config/tradewind/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TRADEWIND_BACKEND__URL` -> `backend.url`,
//! `TRADEWIND_AUTH__BOOTSTRAP_TIMEOUT_SECS` -> `auth.bootstrap_timeout_secs`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use tw_config::TradewindConfig;
//!
//! // Load from all sources (dotenvy + TOML + env):
//! let config = TradewindConfig::load_with_dotenv().expect("config");
//!
//! // Or without dotenvy (env vars must already be set):
//! let config = TradewindConfig::load().expect("config");
//!
//! if config.backend.is_configured() {
//!     println!("Backend URL: {}", config.backend.url);
//! }
//! ```

mod auth;
mod backend;
mod error;
mod realtime;

pub use auth::AuthConfig;
pub use backend::BackendConfig;
pub use error::ConfigError;
pub use realtime::RealtimeConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TradewindConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

impl TradewindConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables (`TRADEWIND_*` prefix)
    /// 2. `.tradewind/config.toml` (project-local)
    /// 3. `~/.config/tradewind/config.toml` (user-global)
    /// 4. Default values
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the hosting
    /// application and tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Check the loaded configuration is usable before wiring the runtime.
    ///
    /// Loading never fails on missing values (every field has a default);
    /// this is the explicit pre-start check the hosting application runs
    /// once after [`Self::load`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotConfigured`] when the backend section is missing
    /// its URL or key, [`ConfigError::InvalidValue`] for zero timeouts or
    /// intervals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "backend".into(),
            });
        }
        if self.auth.bootstrap_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.bootstrap_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.realtime.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "realtime.poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".tradewind/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("TRADEWIND_").split("__"));

        figment
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tradewind").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        // Fallback: try current directory
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = TradewindConfig::default();
        assert!(!config.backend.is_configured());
        assert_eq!(config.auth.bootstrap_timeout_secs, 10);
        assert_eq!(config.realtime.poll_interval_ms, 2000);
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = TradewindConfig::figment();
        let config: TradewindConfig = figment.extract().expect("should extract defaults");
        assert!(!config.backend.is_configured());
        assert_eq!(config.auth.oauth_callback_timeout_secs, 300);
    }

    fn configured() -> TradewindConfig {
        TradewindConfig {
            backend: BackendConfig {
                url: "https://proj.example.co".into(),
                anon_key: "anon_123".into(),
            },
            ..TradewindConfig::default()
        }
    }

    #[test]
    fn validate_passes_on_configured_defaults() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unconfigured_backend() {
        let err = TradewindConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured { ref section } if section == "backend"));
    }

    #[test]
    fn validate_rejects_zero_bootstrap_timeout() {
        let mut config = configured();
        config.auth.bootstrap_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "auth.bootstrap_timeout_secs"
        ));
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut config = configured();
        config.realtime.poll_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "realtime.poll_interval_ms"
        ));
    }
}
