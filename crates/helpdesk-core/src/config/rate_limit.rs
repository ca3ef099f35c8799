//! Request throttling configuration.

use serde::{Deserialize, Serialize};

/// Fixed-window limit applied per client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Requests allowed per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    50
}

fn default_window() -> u64 {
    15
}
