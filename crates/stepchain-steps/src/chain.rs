//! Linear precondition chains over a provider's steps.
//!
//! Step N depends on the largest registered step below N, and the first step
//! depends on the base objective supplied by the caller. Gaps in the
//! numbering are not filled in: steps {1, 5, 9} chain as 9 -> 5 -> 1 -> base.

use std::fmt;
use std::sync::Arc;

use stepchain_core::{Objective, ObjectiveRef, Result, StepChainError};
use tracing::debug;

use crate::node::StepNode;
use crate::provider::{StepProvider, STEP_PREFIX};
use crate::registry::{StepRegistry, StepSet};

/// Shared context of every node built for one provider.
pub struct StepChain<P: StepProvider, E> {
    provider: Arc<P>,
    registry: StepRegistry<P>,
    base: ObjectiveRef<E>,
}

/// Builder for a [`StepChain`].
pub struct StepChainBuilder<P: StepProvider, E> {
    provider: Arc<P>,
    base: Option<ObjectiveRef<E>>,
}

impl<P, E> StepChainBuilder<P, E>
where
    P: StepProvider,
    E: AsMut<P::Handle> + 'static,
{
    /// Start a chain over `provider`.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            base: None,
        }
    }

    /// Set the objective that must hold before the first step runs.
    pub fn base(mut self, base: ObjectiveRef<E>) -> Self {
        self.base = Some(base);
        self
    }

    /// Build the chain.
    pub fn build(self) -> Result<Arc<StepChain<P, E>>> {
        let base = self.base.ok_or_else(|| {
            StepChainError::configuration(P::type_name(), "no base objective supplied")
        })?;

        Ok(StepChain::with_base(self.provider, base))
    }
}

impl<P, E> StepChain<P, E>
where
    P: StepProvider,
    E: AsMut<P::Handle> + 'static,
{
    /// Create a new chain builder.
    pub fn builder(provider: Arc<P>) -> StepChainBuilder<P, E> {
        StepChainBuilder::new(provider)
    }

    pub(crate) fn with_base(provider: Arc<P>, base: ObjectiveRef<E>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            registry: StepRegistry::new(),
            base,
        })
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn base(&self) -> &ObjectiveRef<E> {
        &self.base
    }

    /// The provider's validated steps, discovered on first use.
    pub fn steps(&self) -> Result<&StepSet<P>> {
        self.registry.steps()
    }

    pub(crate) fn registry(&self) -> &StepRegistry<P> {
        &self.registry
    }

    /// The node for step `number`.
    pub fn node(self: &Arc<Self>, number: u32) -> Result<StepNode<P, E>> {
        self.registry.step(number)?;
        Ok(StepNode::new(Arc::clone(self), number))
    }

    /// The sole precondition of step `number`: the node for the closest
    /// registered step below it, or the base objective.
    pub fn precondition_for(self: &Arc<Self>, number: u32) -> Result<ObjectiveRef<E>> {
        let steps = self.steps()?;
        if !steps.contains(number) {
            return Err(StepChainError::configuration(
                P::type_name(),
                format!("unknown step \"{}{}\"", STEP_PREFIX, number),
            ));
        }

        match steps.preceding(number) {
            Some(previous) => {
                debug!(
                    provider = P::type_name(),
                    step = number,
                    requires = previous,
                    "chained to preceding step"
                );
                Ok(Arc::new(StepNode::new(Arc::clone(self), previous)))
            }
            None => {
                debug!(provider = P::type_name(), step = number, "chained to base");
                Ok(Arc::clone(&self.base))
            }
        }
    }

    /// The precondition of the provider as a whole: the last step, or the
    /// base objective when the provider declares no steps.
    pub fn top_precondition(self: &Arc<Self>) -> Result<ObjectiveRef<E>> {
        match self.steps()?.last() {
            Some(last) => Ok(Arc::new(StepNode::new(Arc::clone(self), last))),
            None => Ok(Arc::clone(&self.base)),
        }
    }

    /// Labels from the base objective to the last step, in execution order.
    pub fn ordered_labels(self: &Arc<Self>) -> Result<Vec<String>> {
        let steps = self.steps()?;
        let mut labels = Vec::with_capacity(steps.len() + 1);
        labels.push(self.base.label());
        for number in steps.numbers() {
            labels.push(StepNode::new(Arc::clone(self), number).label());
        }
        Ok(labels)
    }
}

impl<P: StepProvider, E> fmt::Debug for StepChain<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepChain")
            .field("provider", &P::type_name())
            .field("registry", &self.registry)
            .field("base", &self.base.label())
            .finish()
    }
}
