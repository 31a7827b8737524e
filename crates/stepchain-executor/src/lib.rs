//! # Stepchain Executor
//!
//! Reference executor for objective graphs: resolves preconditions
//! depth-first, achieves what is not yet done and records it in an
//! [`AchievedStore`].

pub mod config;
pub mod executor;
pub mod store;

pub use config::ExecutorConfig;
pub use executor::Executor;
pub use store::{AchievedEntry, AchievedStore, InMemoryAchievedStore};
