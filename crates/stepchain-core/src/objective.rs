//! The objective contract.
//!
//! An objective is a unit of work with a stable identity, a list of
//! preconditions and an idempotent `achieve` action. Objectives compose into
//! a dependency graph that an executor resolves depth-first: preconditions
//! first, then `achieve` on whatever has not been achieved yet.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::Result;

/// Shared handle to an objective over environment `E`.
pub type ObjectiveRef<E> = Arc<dyn Objective<E>>;

/// A unit of work resolved by an objective executor.
///
/// `E` is the execution environment threaded through `achieve`. Objectives
/// that do not need it simply hand it back.
pub trait Objective<E>: Send + Sync {
    /// Stable identity. Executors use it to detect work that is already done.
    fn hash(&self) -> String;

    /// Human-readable name for progress reporting. Not used for equality.
    fn label(&self) -> String;

    /// Whether executors should surface this objective in progress output.
    fn is_notable(&self) -> bool {
        false
    }

    /// Objectives that must be achieved before this one.
    fn preconditions(&self, env: &E) -> Result<Vec<ObjectiveRef<E>>>;

    /// Perform the work and return the (possibly updated) environment.
    fn achieve(&self, env: E) -> Result<E>;
}

/// Hex-encoded SHA-256 over `parts`, each part terminated by a NUL byte so
/// that `["ab", "c"]` and `["a", "bc"]` digest differently.
pub fn identity_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// An objective that is always satisfied.
///
/// Useful as the base of a chain when nothing has to exist before the first
/// step runs.
#[derive(Debug, Clone)]
pub struct NullObjective {
    name: String,
}

impl NullObjective {
    /// Create a null objective identified by `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for NullObjective {
    fn default() -> Self {
        Self::new("null")
    }
}

impl<E> Objective<E> for NullObjective {
    fn hash(&self) -> String {
        identity_digest(&["null-objective", &self.name])
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn preconditions(&self, _env: &E) -> Result<Vec<ObjectiveRef<E>>> {
        Ok(Vec::new())
    }

    fn achieve(&self, env: E) -> Result<E> {
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_digest_is_stable_hex() {
        let a = identity_digest(&["demo::Steps"]);
        let b = identity_digest(&["demo::Steps"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_identity_digest_separates_parts() {
        assert_ne!(identity_digest(&["ab", "c"]), identity_digest(&["a", "bc"]));
        assert_ne!(identity_digest(&["a"]), identity_digest(&["a", ""]));
    }

    #[test]
    fn test_null_objective() {
        let base = NullObjective::new("schema exists");
        let pre = Objective::<u32>::preconditions(&base, &7).unwrap();
        assert!(pre.is_empty());
        assert_eq!(Objective::<u32>::achieve(&base, 7).unwrap(), 7);
        assert_eq!(Objective::<u32>::label(&base), "schema exists");
        assert!(!Objective::<u32>::is_notable(&base));
    }
}
