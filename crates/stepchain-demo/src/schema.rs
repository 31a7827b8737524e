//! In-memory schema and a sample migration provider.

use std::collections::BTreeMap;

use serde::Serialize;
use stepchain_core::{identity_digest, Objective, ObjectiveRef, Result, StepChainError};
use stepchain_steps::{step_table, StepDescriptor, StepProvider, StepResult};
use thiserror::Error;
use tracing::info;

/// Name of the bookkeeping table created by [`SchemaExists`].
pub const META_TABLE: &str = "stepchain_meta";

/// Errors raised by schema changes.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table \"{0}\" already exists")]
    TableExists(String),

    #[error("table \"{0}\" does not exist")]
    MissingTable(String),

    #[error("column \"{column}\" already exists on \"{table}\"")]
    ColumnExists { table: String, column: String },

    #[error("column \"{column}\" does not exist on \"{table}\"")]
    MissingColumn { table: String, column: String },
}

/// Tables, their columns, and indexes.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Schema {
    tables: BTreeMap<String, Vec<String>>,
    indexes: Vec<String>,
}

impl Schema {
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn indexes(&self) -> &[String] {
        &self.indexes
    }

    pub fn create_table(
        &mut self,
        table: &str,
        columns: &[&str],
    ) -> std::result::Result<(), SchemaError> {
        if self.has_table(table) {
            return Err(SchemaError::TableExists(table.to_string()));
        }
        self.tables.insert(
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        Ok(())
    }

    pub fn add_column(
        &mut self,
        table: &str,
        column: &str,
    ) -> std::result::Result<(), SchemaError> {
        let columns = self
            .tables
            .get_mut(table)
            .ok_or_else(|| SchemaError::MissingTable(table.to_string()))?;
        if columns.iter().any(|c| c == column) {
            return Err(SchemaError::ColumnExists {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        columns.push(column.to_string());
        Ok(())
    }

    pub fn add_index(
        &mut self,
        table: &str,
        column: &str,
    ) -> std::result::Result<(), SchemaError> {
        let columns = self
            .columns(table)
            .ok_or_else(|| SchemaError::MissingTable(table.to_string()))?;
        if !columns.iter().any(|c| c == column) {
            return Err(SchemaError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        self.indexes.push(format!("{table}_{column}_idx"));
        Ok(())
    }
}

/// Environment threaded through the executor.
#[derive(Debug, Default)]
pub struct Workspace {
    pub schema: Schema,
}

impl AsMut<Schema> for Workspace {
    fn as_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }
}

/// Base objective: the bookkeeping table exists.
pub struct SchemaExists;

impl SchemaExists {
    pub fn shared() -> ObjectiveRef<Workspace> {
        std::sync::Arc::new(SchemaExists)
    }
}

impl Objective<Workspace> for SchemaExists {
    fn hash(&self) -> String {
        identity_digest(&["schema-exists", META_TABLE])
    }

    fn label(&self) -> String {
        format!("schema exists ({META_TABLE})")
    }

    fn preconditions(&self, _env: &Workspace) -> Result<Vec<ObjectiveRef<Workspace>>> {
        Ok(Vec::new())
    }

    fn achieve(&self, mut env: Workspace) -> Result<Workspace> {
        if !env.schema.has_table(META_TABLE) {
            env.schema
                .create_table(META_TABLE, &["key", "value"])
                .map_err(|e| StepChainError::step_failed(self.label(), Box::new(e)))?;
            info!(table = META_TABLE, "created bookkeeping table");
        }
        Ok(env)
    }
}

/// Migrations for the `accounts` table. Step 4 was withdrawn before release.
pub struct AccountSteps;

impl AccountSteps {
    fn step_1(&self, schema: &mut Schema) -> StepResult {
        schema.create_table("accounts", &["id", "username"])?;
        Ok(())
    }

    fn step_2(&self, schema: &mut Schema) -> StepResult {
        schema.add_column("accounts", "email")?;
        Ok(())
    }

    fn step_3(&self, schema: &mut Schema) -> StepResult {
        schema.add_column("accounts", "display_name")?;
        Ok(())
    }

    fn step_5(&self, schema: &mut Schema) -> StepResult {
        schema.add_index("accounts", "email")?;
        Ok(())
    }
}

impl StepProvider for AccountSteps {
    type Handle = Schema;

    fn steps() -> Vec<StepDescriptor<Self>> {
        step_table![Self; step_1, step_2, step_3, step_5]
    }
}
