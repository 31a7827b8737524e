//! # Stepchain Core
//!
//! Core primitives shared by the stepchain crates.
//!
//! This crate provides the fundamental building blocks:
//! - [`Objective`] - A unit of work with an identity, preconditions and an `achieve` action
//! - [`ExecutionReport`] - What an executor did with each objective it visited
//! - [`StepChainError`] - Error types

pub mod error;
pub mod objective;
pub mod report;
pub mod types;

// Re-exports for convenience
pub use error::{Result, SharedStepFailure, StepChainError};
pub use objective::{identity_digest, NullObjective, Objective, ObjectiveRef};
pub use report::{ExecutionEvent, ExecutionReport};
pub use types::*;

