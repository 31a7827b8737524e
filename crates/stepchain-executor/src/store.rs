//! Achieved-objective stores.
//!
//! The executor consults a store to tell which objectives are already done,
//! so that resolving an achieved chain a second time runs nothing.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepchain_core::{Result, StepChainError};

/// A record of one achieved objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievedEntry {
    /// Hash of the objective.
    pub hash: String,

    /// Label at the time it was achieved.
    pub label: String,

    /// When it was achieved.
    pub achieved_at: DateTime<Utc>,
}

/// Trait for achieved-objective stores.
///
/// Entries are keyed by objective hash alone. A store that outlives a code
/// change keeps matching objectives whose identity did not change, such as
/// a provider's top objective after a step was added to it; the executor
/// still walks the preconditions of such objectives, so the new step runs.
pub trait AchievedStore: Send + Sync {
    /// Whether the objective with `hash` has been achieved.
    fn contains(&self, hash: &str) -> Result<bool>;

    /// Look up an entry by hash.
    fn get(&self, hash: &str) -> Result<Option<AchievedEntry>>;

    /// Record an objective as achieved. Recording a hash twice keeps the
    /// first entry.
    fn record(&self, hash: &str, label: &str) -> Result<AchievedEntry>;

    /// Forget an objective so the next run achieves it again.
    fn forget(&self, hash: &str) -> Result<bool>;

    /// All entries, in the order they were recorded.
    fn achieved(&self) -> Result<Vec<AchievedEntry>>;
}

/// In-memory implementation of AchievedStore.
#[derive(Debug, Default)]
pub struct InMemoryAchievedStore {
    entries: RwLock<IndexMap<String, AchievedEntry>>,
}

impl InMemoryAchievedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of achieved objectives.
    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StepChainError {
    StepChainError::Store {
        message: "achieved store lock poisoned".to_string(),
    }
}

impl AchievedStore for InMemoryAchievedStore {
    fn contains(&self, hash: &str) -> Result<bool> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.contains_key(hash))
    }

    fn get(&self, hash: &str) -> Result<Option<AchievedEntry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(hash).cloned())
    }

    fn record(&self, hash: &str, label: &str) -> Result<AchievedEntry> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries
            .entry(hash.to_string())
            .or_insert_with(|| AchievedEntry {
                hash: hash.to_string(),
                label: label.to_string(),
                achieved_at: Utc::now(),
            });
        Ok(entry.clone())
    }

    fn forget(&self, hash: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries.shift_remove(hash).is_some())
    }

    fn achieved(&self) -> Result<Vec<AchievedEntry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.values().cloned().collect())
    }
}
