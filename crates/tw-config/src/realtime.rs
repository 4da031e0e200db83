//! Change-feed subscription configuration.

use serde::{Deserialize, Serialize};

const fn default_poll_interval() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealtimeConfig {
    /// Milliseconds between change-feed polls of a subscribed table.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}
