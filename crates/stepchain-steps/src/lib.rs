//! # Stepchain Steps
//!
//! Turns a provider's numbered steps into a linear chain of objectives.
//!
//! - [`StepRegistry`] - Discovers, validates and orders a provider's steps
//! - [`StepNode`] - Objective for "step N has run"
//! - [`StepChain`] - Computes each step's single precondition
//! - [`ProviderObjective`] - The whole provider as one objective

pub mod adapter;
pub mod chain;
mod macros;
pub mod node;
pub mod provider;
pub mod registry;

#[cfg(test)]
mod testing;

pub use adapter::ProviderObjective;
pub use chain::{StepChain, StepChainBuilder};
pub use node::StepNode;
pub use provider::{StepDescriptor, StepFailure, StepFn, StepProvider, StepResult, STEP_PREFIX};
pub use registry::{discover_steps, StepRegistry, StepSet};
