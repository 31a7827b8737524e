//! Objectives for individual steps.

use std::fmt;
use std::sync::Arc;

use stepchain_core::{identity_digest, Objective, ObjectiveRef, Result, StepChainError};
use tracing::{debug, warn};

use crate::chain::StepChain;
use crate::provider::{StepProvider, STEP_PREFIX};

/// "Step N of provider P has been executed."
///
/// Nodes are cheap and built on demand whenever a precondition is requested.
/// Two nodes for the same provider type and step number share a hash, which
/// is how an executor recognizes a step it has already achieved.
pub struct StepNode<P: StepProvider, E> {
    chain: Arc<StepChain<P, E>>,
    number: u32,
}

impl<P: StepProvider, E> StepNode<P, E> {
    pub(crate) fn new(chain: Arc<StepChain<P, E>>, number: u32) -> Self {
        Self { chain, number }
    }

    /// The step number this node executes.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The step's method name, e.g. `step_4`.
    pub fn step_name(&self) -> String {
        format!("{}{}", STEP_PREFIX, self.number)
    }
}

impl<P, E> Objective<E> for StepNode<P, E>
where
    P: StepProvider,
    E: AsMut<P::Handle> + 'static,
{
    fn hash(&self) -> String {
        identity_digest(&[P::type_name(), &self.step_name()])
    }

    fn label(&self) -> String {
        format!("{} {}", P::type_name(), self.step_name())
    }

    fn is_notable(&self) -> bool {
        true
    }

    fn preconditions(&self, _env: &E) -> Result<Vec<ObjectiveRef<E>>> {
        Ok(vec![self.chain.precondition_for(self.number)?])
    }

    fn achieve(&self, mut env: E) -> Result<E> {
        let step = self.chain.registry().step(self.number)?;

        debug!(provider = P::type_name(), step = step.name(), "running step");

        if let Err(failure) = step.run(self.chain.provider(), env.as_mut()) {
            warn!(
                provider = P::type_name(),
                step = step.name(),
                error = %failure,
                "step failed"
            );
            return Err(StepChainError::step_failed(self.label(), failure));
        }

        Ok(env)
    }
}

impl<P: StepProvider, E> Clone for StepNode<P, E> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            number: self.number,
        }
    }
}

impl<P: StepProvider, E> fmt::Debug for StepNode<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepNode")
            .field("provider", &P::type_name())
            .field("number", &self.number)
            .finish()
    }
}
