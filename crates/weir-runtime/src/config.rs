//! Runtime-optimizer configuration.

use serde::{Deserialize, Serialize};

use crate::skew::DEFAULT_SKEWED_KEY_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeOptimizerConfig {
    /// Number of largest keys marked as skewed during a rebalance.
    pub skewed_key_count: usize,
}

impl Default for RuntimeOptimizerConfig {
    fn default() -> Self {
        Self {
            skewed_key_count: DEFAULT_SKEWED_KEY_COUNT,
        }
    }
}

impl RuntimeOptimizerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `WEIR_SKEWED_KEY_COUNT`: number of keys marked as skewed
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("WEIR_SKEWED_KEY_COUNT") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.skewed_key_count = v;
            }
        }

        cfg
    }
}
