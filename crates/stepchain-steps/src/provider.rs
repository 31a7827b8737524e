//! Step providers and their registration tables.

use std::fmt;

/// Name prefix shared by every step. A step named `step_7` is step number 7.
pub const STEP_PREFIX: &str = "step_";

/// Failure raised by a step. Passed through to the executor untouched.
pub type StepFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of a step.
pub type StepResult = std::result::Result<(), StepFailure>;

/// Signature of a step: the provider plus a mutable borrow of the resource
/// the steps act on.
pub type StepFn<P> = fn(&P, &mut <P as StepProvider>::Handle) -> StepResult;

/// An object declaring numbered, idempotent steps for one area of update work.
///
/// Implementors list their steps in [`StepProvider::steps`], usually with
/// [`step_table!`](crate::step_table):
///
/// ```
/// use stepchain_steps::{step_table, StepDescriptor, StepProvider, StepResult};
///
/// struct Counter;
///
/// impl Counter {
///     fn step_1(&self, total: &mut u32) -> StepResult {
///         *total += 1;
///         Ok(())
///     }
///
///     fn step_2(&self, total: &mut u32) -> StepResult {
///         *total *= 10;
///         Ok(())
///     }
/// }
///
/// impl StepProvider for Counter {
///     type Handle = u32;
///
///     fn steps() -> Vec<StepDescriptor<Self>> {
///         step_table![Self; step_1, step_2]
///     }
/// }
///
/// assert_eq!(Counter::steps().len(), 2);
/// ```
pub trait StepProvider: Send + Sync + Sized + 'static {
    /// Resource handed to every step (a database connection, a schema, ...).
    type Handle;

    /// The provider's declared steps. Order does not matter.
    fn steps() -> Vec<StepDescriptor<Self>>;

    /// Fully qualified type name, used for identity and labels.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A named step function.
pub struct StepDescriptor<P: StepProvider> {
    name: &'static str,
    run: StepFn<P>,
}

impl<P: StepProvider> StepDescriptor<P> {
    /// Create a descriptor. `name` is expected to be `step_<N>`.
    pub fn new(name: &'static str, run: StepFn<P>) -> Self {
        Self { name, run }
    }

    /// The step's method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the step.
    pub fn run(&self, provider: &P, handle: &mut P::Handle) -> StepResult {
        (self.run)(provider, handle)
    }
}

impl<P: StepProvider> Clone for StepDescriptor<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: StepProvider> Copy for StepDescriptor<P> {}

impl<P: StepProvider> fmt::Debug for StepDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("provider", &P::type_name())
            .field("name", &self.name)
            .finish()
    }
}
