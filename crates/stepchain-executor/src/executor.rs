//! Depth-first objective executor.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use stepchain_core::{
    ExecutionEvent, ExecutionReport, Objective, ObjectiveRef, Result, StepChainError,
};
use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;
use crate::store::{AchievedStore, InMemoryAchievedStore};

/// Resolves an objective graph: preconditions first, then `achieve`.
///
/// The walk keeps its own work stack, so the length of a chain is limited
/// by `max_depth` rather than by the thread's stack. Objectives whose hash
/// is already in the store are not achieved again, but their preconditions
/// are still visited: a step that was never recorded runs even when the
/// objective above it was. Errors are not retried; the first failure ends
/// the run.
pub struct Executor<S: AchievedStore = InMemoryAchievedStore> {
    config: ExecutorConfig,
    store: S,
}

/// Bookkeeping for a single `resolve` call.
struct Run {
    /// Hashes on the path from the root to the objective being visited.
    on_path: HashSet<String>,
    /// Labels along the same path, root first, for cycle reports.
    labels: Vec<String>,
    /// Hashes settled during this run.
    settled: HashSet<String>,
    report: ExecutionReport,
}

/// An objective whose preconditions are queued above it on the stack.
struct Pending<E> {
    objective: ObjectiveRef<E>,
    hash: String,
    label: String,
    notable: bool,
    recorded: bool,
}

enum Frame<E> {
    /// Check the objective and queue its preconditions.
    Enter(ObjectiveRef<E>),
    /// Preconditions are settled; achieve or skip the objective.
    Leave(Pending<E>),
}

impl Executor<InMemoryAchievedStore> {
    /// Create an executor with default configuration and an in-memory store.
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    /// Create an executor with custom configuration and an in-memory store.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self::with_store(config, InMemoryAchievedStore::new())
    }
}

impl Default for Executor<InMemoryAchievedStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AchievedStore> Executor<S> {
    /// Create an executor backed by `store`.
    pub fn with_store(config: ExecutorConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `root` and everything it depends on.
    ///
    /// Returns the environment as left by the last `achieve` together with a
    /// report of what happened to each objective.
    pub fn resolve<E>(&self, root: &ObjectiveRef<E>, env: E) -> Result<(E, ExecutionReport)> {
        let started = Instant::now();
        info!(root = %root.label(), dry_run = self.config.dry_run, "resolving objective");

        let mut run = Run {
            on_path: HashSet::new(),
            labels: Vec::new(),
            settled: HashSet::new(),
            report: ExecutionReport::new(root.hash(), root.label()),
        };

        let mut env = env;
        let mut stack = vec![Frame::Enter(Arc::clone(root))];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(objective) => self.enter(objective, &env, &mut stack, &mut run)?,
                Frame::Leave(pending) => env = self.leave(pending, env, &mut run)?,
            }
        }
        run.report.finish();

        info!(
            root = %root.label(),
            achieved = run.report.achieved_labels().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "objective resolved"
        );

        Ok((env, run.report))
    }

    fn enter<E>(
        &self,
        objective: ObjectiveRef<E>,
        env: &E,
        stack: &mut Vec<Frame<E>>,
        run: &mut Run,
    ) -> Result<()> {
        let hash = objective.hash();
        if run.settled.contains(&hash) {
            return Ok(());
        }

        let label = objective.label();
        if run.on_path.contains(&hash) {
            let mut cycle = run.labels.clone();
            cycle.push(label);
            return Err(StepChainError::PreconditionCycle {
                cycle: cycle.join(" -> "),
            });
        }

        if run.labels.len() > self.config.max_depth {
            return Err(StepChainError::DepthExceeded {
                objective: label,
                max_depth: self.config.max_depth,
            });
        }

        let recorded = self.config.skip_achieved && self.store.contains(&hash)?;
        let preconditions = objective.preconditions(env)?;

        run.on_path.insert(hash.clone());
        run.labels.push(label.clone());

        let notable = objective.is_notable();
        stack.push(Frame::Leave(Pending {
            objective,
            hash,
            label,
            notable,
            recorded,
        }));
        // Reversed so the first precondition is resolved first.
        stack.extend(preconditions.into_iter().rev().map(Frame::Enter));

        Ok(())
    }

    fn leave<E>(&self, pending: Pending<E>, env: E, run: &mut Run) -> Result<E> {
        let Pending {
            objective,
            hash,
            label,
            notable,
            recorded,
        } = pending;

        run.on_path.remove(&hash);
        run.labels.pop();

        if recorded {
            debug!(objective = %label, "already achieved");
            run.report.add_event(ExecutionEvent::skipped(hash.clone(), label, notable));
            run.settled.insert(hash);
            return Ok(env);
        }

        if self.config.dry_run {
            run.report.add_event(ExecutionEvent::planned(hash.clone(), label, notable));
            run.settled.insert(hash);
            return Ok(env);
        }

        if notable {
            info!(objective = %label, "achieving");
        } else {
            debug!(objective = %label, "achieving");
        }

        let started = Instant::now();
        let env = objective.achieve(env).map_err(|err| {
            warn!(objective = %label, error = %err, "objective failed");
            err
        })?;
        let duration_ms = started.elapsed().as_millis() as u64;

        self.store.record(&hash, &label)?;
        run.report.add_event(ExecutionEvent::achieved(
            hash.clone(),
            label,
            notable,
            duration_ms,
        ));
        run.settled.insert(hash);

        Ok(env)
    }
}
