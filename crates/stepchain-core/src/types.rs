//! Common types used across stepchain.

use serde::{Deserialize, Serialize};

/// What happened to an objective during one executor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    /// Listed in execution order without being achieved (dry run).
    Planned,
    /// Already achieved by an earlier run and not achieved again.
    Skipped,
    /// Achieved during this run.
    Achieved,
}
