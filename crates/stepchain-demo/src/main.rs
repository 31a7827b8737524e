//! # Stepchain Demo
//!
//! Migrates an in-memory schema through the stepchain executor, then runs
//! the same objective again to show that nothing is applied twice.

use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::Context;
use stepchain_executor::{AchievedStore, Executor, ExecutorConfig};
use stepchain_steps::ProviderObjective;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod schema;

use schema::{AccountSteps, SchemaExists, Workspace};

/// Environment variable naming a JSON executor configuration file.
const CONFIG_ENV: &str = "STEPCHAIN_CONFIG";

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Read the executor configuration from `path`, or use the defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<ExecutorConfig> {
    let Some(path) = path else {
        return Ok(ExecutorConfig::default());
    };

    let json =
        fs::read_to_string(path).with_context(|| format!("reading executor config from {path}"))?;
    let config = ExecutorConfig::from_json(&json)
        .with_context(|| format!("parsing executor config from {path}"))?;
    info!(%path, "loaded executor config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = load_config(env::var(CONFIG_ENV).ok().as_deref())?;
    let executor = Executor::with_config(config);
    info!(
        max_depth = executor.config().max_depth,
        skip_achieved = executor.config().skip_achieved,
        dry_run = executor.config().dry_run,
        "executor ready"
    );
    let accounts = ProviderObjective::new(Arc::new(AccountSteps), SchemaExists::shared());

    for label in accounts.chain().ordered_labels()? {
        info!(objective = %label, "planned");
    }

    let root = accounts.into_ref();

    let (workspace, report) = executor.resolve(&root, Workspace::default())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", serde_json::to_string_pretty(&workspace.schema)?);

    let (_, rerun) = executor.resolve(&root, workspace)?;
    info!(
        achieved = rerun.achieved_labels().len(),
        recorded = executor.store().achieved()?.len(),
        "second run finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), ExecutorConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "dry_run": true, "max_depth": 64 }}"#).unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.max_depth, 64);
        assert!(config.skip_achieved);
    }

    #[test]
    fn test_load_config_reports_the_path() {
        let missing = tempfile::tempdir().unwrap().path().join("missing.json");
        let path = missing.to_str().unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains(path));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(err.to_string().starts_with("parsing executor config"));
    }
}
