//! Step discovery and validation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use stepchain_core::{Result, StepChainError};
use tracing::debug;

use crate::provider::{StepDescriptor, StepProvider, STEP_PREFIX};

// ASCII only: `\d` would also accept non-ASCII digits.
static STEP_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9][0-9]*$").unwrap());

/// A provider's validated steps, keyed by step number.
pub struct StepSet<P: StepProvider> {
    steps: BTreeMap<u32, StepDescriptor<P>>,
}

impl<P: StepProvider> StepSet<P> {
    /// Step numbers in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.keys().copied()
    }

    /// Look up a step by number.
    pub fn get(&self, number: u32) -> Option<&StepDescriptor<P>> {
        self.steps.get(&number)
    }

    /// Whether `number` is a registered step.
    pub fn contains(&self, number: u32) -> bool {
        self.steps.contains_key(&number)
    }

    /// The highest step number, if any.
    pub fn last(&self) -> Option<u32> {
        self.steps.keys().next_back().copied()
    }

    /// The largest registered step number strictly below `number`.
    pub fn preceding(&self, number: u32) -> Option<u32> {
        self.steps.range(..number).next_back().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<P: StepProvider> fmt::Debug for StepSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSet")
            .field("provider", &P::type_name())
            .field("numbers", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Validate `descriptors` and order them by step number.
///
/// Descriptors whose name lacks [`STEP_PREFIX`] are ignored. A prefixed name
/// whose suffix is not a positive decimal without leading zeros, or that
/// repeats a number, fails the whole discovery.
pub fn discover_steps<P: StepProvider>(
    descriptors: Vec<StepDescriptor<P>>,
) -> Result<StepSet<P>> {
    let provider = P::type_name();
    let mut steps = BTreeMap::new();

    for descriptor in descriptors {
        let Some(suffix) = descriptor.name().strip_prefix(STEP_PREFIX) else {
            continue;
        };

        if !STEP_NUMBER.is_match(suffix) {
            return Err(StepChainError::configuration(
                provider,
                format!("odd-looking step number \"{}\"", descriptor.name()),
            ));
        }

        let number: u32 = suffix.parse().map_err(|_| {
            StepChainError::configuration(
                provider,
                format!("step number out of range \"{}\"", descriptor.name()),
            )
        })?;

        if steps.insert(number, descriptor).is_some() {
            return Err(StepChainError::configuration(
                provider,
                format!("duplicate step \"{}\"", descriptor.name()),
            ));
        }
    }

    debug!(provider, count = steps.len(), "discovered steps");

    Ok(StepSet { steps })
}

/// Memoized step discovery for one provider.
///
/// Discovery runs on first access; the outcome, success or failure, is
/// returned unchanged on every later call.
pub struct StepRegistry<P: StepProvider> {
    cache: OnceLock<Result<StepSet<P>>>,
}

impl<P: StepProvider> StepRegistry<P> {
    pub fn new() -> Self {
        Self {
            cache: OnceLock::new(),
        }
    }

    /// The provider's validated steps.
    pub fn steps(&self) -> Result<&StepSet<P>> {
        match self.cache.get_or_init(|| discover_steps(P::steps())) {
            Ok(steps) => Ok(steps),
            Err(err) => Err(err.clone()),
        }
    }

    /// Look up a registered step, failing on unknown numbers.
    pub fn step(&self, number: u32) -> Result<&StepDescriptor<P>> {
        self.steps()?.get(number).ok_or_else(|| {
            StepChainError::configuration(
                P::type_name(),
                format!("unknown step \"{}{}\"", STEP_PREFIX, number),
            )
        })
    }
}

impl<P: StepProvider> Default for StepRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StepProvider> fmt::Debug for StepRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("provider", &P::type_name())
            .field("discovered", &self.cache.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StepResult;

    struct Fixture;

    fn noop(_: &Fixture, _: &mut ()) -> StepResult {
        Ok(())
    }

    impl StepProvider for Fixture {
        type Handle = ();

        fn steps() -> Vec<StepDescriptor<Self>> {
            named(&["step_9", "step_1", "helper", "step_5"])
        }
    }

    fn named(names: &[&'static str]) -> Vec<StepDescriptor<Fixture>> {
        names.iter().map(|n| StepDescriptor::new(*n, noop)).collect()
    }

    #[test]
    fn test_discovery_sorts_ascending() {
        let set = discover_steps(named(&["step_4", "step_1", "step_2"])).unwrap();
        assert_eq!(set.numbers().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(set.last(), Some(4));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_unprefixed_names_are_ignored() {
        let set = discover_steps(named(&["setup", "stepper_1", "step_3"])).unwrap();
        assert_eq!(set.numbers().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_malformed_suffixes_are_rejected() {
        for bad in ["step_0", "step_01", "step_abc", "step_", "step_-1", "step_1a", "step_ 1"] {
            let err = discover_steps(named(&["step_1", bad])).unwrap_err();
            assert!(err.is_configuration(), "{bad} should be rejected");
            assert!(err.to_string().contains("odd-looking step number"), "{err}");
        }
    }

    #[test]
    fn test_out_of_range_number_is_rejected() {
        let err = discover_steps(named(&["step_99999999999"])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_duplicate_number_is_rejected() {
        let err = discover_steps(named(&["step_2", "step_2"])).unwrap_err();
        assert!(err.to_string().contains("duplicate step"));
    }

    #[test]
    fn test_empty_discovery() {
        let set = discover_steps(named(&["helper"])).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.last(), None);
        assert_eq!(set.preceding(1), None);
    }

    #[test]
    fn test_preceding_skips_gaps() {
        let set = discover_steps(named(&["step_1", "step_5", "step_9"])).unwrap();
        assert_eq!(set.preceding(9), Some(5));
        assert_eq!(set.preceding(5), Some(1));
        assert_eq!(set.preceding(1), None);
        assert_eq!(set.preceding(7), Some(5));
        assert_eq!(set.preceding(u32::MAX), Some(9));
    }

    #[test]
    fn test_preceding_on_a_long_chain() {
        let names: Vec<&'static str> = (1..=3000)
            .map(|n| &*Box::leak(format!("step_{n}").into_boxed_str()))
            .collect();
        let set = discover_steps(named(&names)).unwrap();
        assert_eq!(set.preceding(3000), Some(2999));
        assert_eq!(set.preceding(2), Some(1));
        assert_eq!(set.preceding(3001), Some(3000));
    }

    #[test]
    fn test_registry_memoizes() {
        let registry = StepRegistry::<Fixture>::new();
        let first = registry.steps().unwrap() as *const StepSet<Fixture>;
        let second = registry.steps().unwrap() as *const StepSet<Fixture>;
        assert_eq!(first, second);
        assert_eq!(
            registry.steps().unwrap().numbers().collect::<Vec<_>>(),
            vec![1, 5, 9]
        );
    }

    #[test]
    fn test_registry_unknown_step() {
        let registry = StepRegistry::<Fixture>::new();
        assert_eq!(registry.step(5).unwrap().name(), "step_5");

        let err = registry.step(2).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("unknown step \"step_2\""));
    }

    struct Broken;

    impl StepProvider for Broken {
        type Handle = ();

        fn steps() -> Vec<StepDescriptor<Self>> {
            vec![StepDescriptor::new("step_01", |_, _| Ok(()))]
        }
    }

    #[test]
    fn test_registry_caches_failure() {
        let registry = StepRegistry::<Broken>::new();
        assert!(registry.steps().is_err());
        assert!(registry.steps().unwrap_err().is_configuration());
        assert!(registry.step(1).is_err());
    }
}
