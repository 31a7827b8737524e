//! Executor configuration.

use serde::{Deserialize, Serialize};
use stepchain_core::Result;

/// Configuration for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum length of a precondition path below the root.
    pub max_depth: usize,

    /// Do not achieve objectives whose hash the store already holds. Their
    /// preconditions are still visited.
    pub skip_achieved: bool,

    /// List objectives in execution order without achieving them.
    pub dry_run: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_depth: 16_384,
            skip_achieved: true,
            dry_run: false,
        }
    }
}

impl ExecutorConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
