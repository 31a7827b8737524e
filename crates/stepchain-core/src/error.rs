//! Error types for stepchain.

use std::sync::Arc;

use thiserror::Error;

/// Opaque failure raised by a step, shared so the error stays cloneable.
pub type SharedStepFailure = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for stepchain operations.
#[derive(Error, Debug, Clone)]
pub enum StepChainError {
    /// The provider's step table is malformed, or an unknown step was requested.
    #[error("Configuration error in {provider}: {message}")]
    Configuration { provider: String, message: String },

    /// A step raised an error while being achieved.
    #[error("Step failed while achieving {objective}: {source}")]
    StepExecution {
        objective: String,
        source: SharedStepFailure,
    },

    /// An objective was found among its own transitive preconditions.
    #[error("Precondition cycle detected: {cycle}")]
    PreconditionCycle { cycle: String },

    /// Precondition resolution went deeper than the configured limit.
    #[error("Precondition depth limit of {max_depth} exceeded at {objective}")]
    DepthExceeded { objective: String, max_depth: usize },

    /// Achieved-objective store error.
    #[error("Achieved store error: {message}")]
    Store { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StepChainError {
    /// Build a configuration error for the given provider.
    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        StepChainError::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure raised by a step without altering it.
    pub fn step_failed(
        objective: impl Into<String>,
        failure: Box<dyn std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        StepChainError::StepExecution {
            objective: objective.into(),
            source: Arc::from(failure),
        }
    }

    /// Returns true if this error points at a mistake in a provider's step table.
    pub fn is_configuration(&self) -> bool {
        matches!(self, StepChainError::Configuration { .. })
    }

    /// Returns the failure raised by the step, if this is a step execution error.
    pub fn step_failure(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            StepChainError::StepExecution { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Convenience Result type for stepchain operations.
pub type Result<T> = std::result::Result<T, StepChainError>;

impl From<serde_json::Error> for StepChainError {
    fn from(err: serde_json::Error) -> Self {
        StepChainError::SerializationError(err.to_string())
    }
}
