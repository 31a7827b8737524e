//! The provider as a single objective.

use std::fmt;
use std::sync::Arc;

use stepchain_core::{identity_digest, Objective, ObjectiveRef, Result};

use crate::chain::StepChain;
use crate::node::StepNode;
use crate::provider::StepProvider;

/// Objective that holds once every step of a provider has run.
///
/// Its only precondition is the provider's last step, which transitively
/// pulls in the whole chain down to the base objective. `achieve` itself does
/// nothing: the work happens in the step nodes as the executor resolves them.
pub struct ProviderObjective<P: StepProvider, E> {
    chain: Arc<StepChain<P, E>>,
}

impl<P, E> ProviderObjective<P, E>
where
    P: StepProvider,
    E: AsMut<P::Handle> + 'static,
{
    /// Wrap `provider`, with `base` as the precondition of its first step.
    pub fn new(provider: Arc<P>, base: ObjectiveRef<E>) -> Self {
        Self {
            chain: StepChain::with_base(provider, base),
        }
    }

    pub fn chain(&self) -> &Arc<StepChain<P, E>> {
        &self.chain
    }

    /// Registered step numbers, ascending.
    pub fn steps(&self) -> Result<Vec<u32>> {
        Ok(self.chain.steps()?.numbers().collect())
    }

    /// The node for step `number`.
    pub fn step(&self, number: u32) -> Result<StepNode<P, E>> {
        self.chain.node(number)
    }

    /// Erase the concrete type for handing to an executor.
    pub fn into_ref(self) -> ObjectiveRef<E> {
        Arc::new(self)
    }
}

impl<P, E> Objective<E> for ProviderObjective<P, E>
where
    P: StepProvider,
    E: AsMut<P::Handle> + 'static,
{
    fn hash(&self) -> String {
        identity_digest(&[P::type_name()])
    }

    fn label(&self) -> String {
        P::type_name().to_string()
    }

    fn is_notable(&self) -> bool {
        true
    }

    fn preconditions(&self, _env: &E) -> Result<Vec<ObjectiveRef<E>>> {
        Ok(vec![self.chain.top_precondition()?])
    }

    fn achieve(&self, env: E) -> Result<E> {
        Ok(env)
    }
}

impl<P: StepProvider, E> fmt::Debug for ProviderObjective<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderObjective")
            .field("chain", &self.chain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recording_base, Broken, Env, Gapped, Linear, NoSteps};

    fn objective<P>(provider: P) -> ProviderObjective<P, Env>
    where
        P: StepProvider,
        Env: AsMut<P::Handle>,
    {
        ProviderObjective::new(Arc::new(provider), recording_base())
    }

    #[test]
    fn test_steps_are_ascending() {
        assert_eq!(objective(Linear).steps().unwrap(), vec![1, 2, 4]);
        assert_eq!(objective(Gapped).steps().unwrap(), vec![1, 5, 9]);
        assert!(objective(NoSteps).steps().unwrap().is_empty());
    }

    #[test]
    fn test_scenario_one_two_four() {
        let top = objective(Linear);
        let env = Env::default();

        let pre = top.preconditions(&env).unwrap();
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].hash(), top.step(4).unwrap().hash());

        let pre = pre[0].preconditions(&env).unwrap();
        assert_eq!(pre[0].hash(), top.step(2).unwrap().hash());

        let pre = pre[0].preconditions(&env).unwrap();
        assert_eq!(pre[0].hash(), top.step(1).unwrap().hash());

        let pre = pre[0].preconditions(&env).unwrap();
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].label(), "base");
    }

    #[test]
    fn test_empty_provider_requires_only_base() {
        let top = objective(NoSteps);
        let pre = top.preconditions(&Env::default()).unwrap();
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].label(), "base");
    }

    #[test]
    fn test_achieve_is_identity() {
        let top = objective(Linear);
        let mut env = Env::default();
        env.journal.push("untouched".to_string());

        let env = top.achieve(env).unwrap();
        assert_eq!(env.journal, vec!["untouched".to_string()]);
    }

    #[test]
    fn test_hash_is_stable_per_type() {
        let a = objective(Linear);
        let b = objective(Linear);
        assert_eq!(a.hash(), a.hash());
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), objective(Gapped).hash());
        assert_ne!(a.hash(), a.step(4).unwrap().hash());
        assert!(a.is_notable());
        assert!(a.label().ends_with("Linear"));
    }

    #[test]
    fn test_unknown_step() {
        let err = objective(Linear).step(3).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("unknown step"));
    }

    #[test]
    fn test_malformed_provider_fails_everywhere() {
        let top = objective(Broken);
        assert!(top.steps().unwrap_err().is_configuration());
        assert!(matches!(
            top.preconditions(&Env::default()),
            Err(err) if err.is_configuration()
        ));
    }
}
