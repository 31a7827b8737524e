//! Fixture providers shared by the unit tests.

use std::sync::Arc;

use stepchain_core::{identity_digest, Objective, ObjectiveRef, Result};
use thiserror::Error;

use crate::provider::{StepDescriptor, StepProvider, StepResult};
use crate::step_table;

/// Environment whose handle is a journal of everything that ran.
#[derive(Debug, Default)]
pub struct Env {
    pub journal: Vec<String>,
}

impl AsMut<Vec<String>> for Env {
    fn as_mut(&mut self) -> &mut Vec<String> {
        &mut self.journal
    }
}

#[derive(Debug, Error)]
#[error("column \"{0}\" already exists")]
pub struct StepError(pub String);

struct RecordingBase;

impl Objective<Env> for RecordingBase {
    fn hash(&self) -> String {
        identity_digest(&["base"])
    }

    fn label(&self) -> String {
        "base".to_string()
    }

    fn preconditions(&self, _env: &Env) -> Result<Vec<ObjectiveRef<Env>>> {
        Ok(Vec::new())
    }

    fn achieve(&self, mut env: Env) -> Result<Env> {
        env.journal.push("base".to_string());
        Ok(env)
    }
}

pub fn recording_base() -> ObjectiveRef<Env> {
    Arc::new(RecordingBase)
}

macro_rules! recording_steps {
    ($provider:ident; $($step:ident),*) => {
        impl $provider {
            $(
                fn $step(&self, journal: &mut Vec<String>) -> StepResult {
                    journal.push(format!("{}::{}", stringify!($provider), stringify!($step)));
                    Ok(())
                }
            )*
        }

        impl StepProvider for $provider {
            type Handle = Vec<String>;

            fn steps() -> Vec<StepDescriptor<Self>> {
                step_table![Self; $($step),*]
            }
        }
    };
}

/// Steps 1, 2 and 4.
pub struct Linear;
recording_steps!(Linear; step_4, step_1, step_2);

/// Steps 1, 5 and 9.
pub struct Gapped;
recording_steps!(Gapped; step_9, step_5, step_1);

pub struct NoSteps;
recording_steps!(NoSteps;);

/// A prefixed method with a leading zero.
pub struct Broken;
recording_steps!(Broken; step_1, step_02);

/// Step 2 always fails.
pub struct Failing;

impl Failing {
    fn step_1(&self, journal: &mut Vec<String>) -> StepResult {
        journal.push("Failing::step_1".to_string());
        Ok(())
    }

    fn step_2(&self, _journal: &mut Vec<String>) -> StepResult {
        Err(Box::new(StepError("email".to_string())))
    }
}

impl StepProvider for Failing {
    type Handle = Vec<String>;

    fn steps() -> Vec<StepDescriptor<Self>> {
        step_table![Self; step_1, step_2]
    }
}
