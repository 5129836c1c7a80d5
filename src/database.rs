//! Table registry and CRUD entry points
//!
//! One reader/writer lock guards the registry and the content of every
//! table. Reads (select, join, describe, listing) share it; every mutation,
//! including index creation, takes it exclusively. Index maintenance happens
//! inside the same critical section as the row change, so a reader never
//! observes an index out of step with its table.

use crate::config::DatabaseConfig;
use crate::constraints::ConstraintChecker;
use crate::error::{DbError, Result, UpdateError};
use crate::executor::{evaluate_condition, project_row, Condition};
use crate::index::RowPosition;
use crate::schema::Schema;
use crate::table::Table;
use crate::types::Row;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Summary of one table, detached from the lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub schema: Schema,
    pub primary_key: Option<String>,
    pub row_count: usize,
    pub indexed_columns: Vec<String>,
}

/// In-memory database: a set of named tables under one lock
#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<HashMap<String, Table>>,
    config: DatabaseConfig,
}

impl Database {
    /// Create an empty database with the default configuration
    pub fn new() -> Self {
        Self::with_config(DatabaseConfig::default())
    }

    pub fn with_config(config: DatabaseConfig) -> Self {
        Database {
            tables: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Register a new, empty table
    #[instrument(level = "debug", skip(self, schema), fields(table = %name))]
    pub fn create_table(&self, name: &str, schema: Schema) -> Result<()> {
        let mut tables = self.tables.write();

        if tables.contains_key(name) {
            return Err(DbError::TableAlreadyExists(name.to_string()));
        }
        if let Some(limit) = self.config.max_tables {
            if tables.len() >= limit {
                return Err(DbError::TableLimitReached { limit });
            }
        }

        let table = Table::new(name, schema)?;
        debug!(columns = table.columns().len(), indexes = ?table.indexed_columns(), "table created");
        tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Shared access to a table.
    ///
    /// The returned guard holds the database's read lock until dropped, so
    /// writers anywhere in the database wait for it. The lock is not
    /// reentrant: calling any other `Database` method on the same thread
    /// while the guard is alive can deadlock once a writer is queued.
    pub fn get_table(&self, name: &str) -> Result<MappedRwLockReadGuard<'_, Table>> {
        RwLockReadGuard::try_map(self.tables.read(), |tables| tables.get(name))
            .map_err(|_| DbError::TableNotFound(name.to_string()))
    }

    #[instrument(level = "debug", skip(self), fields(table = %name))]
    pub fn drop_table(&self, name: &str) -> Result<()> {
        match self.tables.write().remove(name) {
            Some(table) => {
                debug!(rows = table.len(), "table dropped");
                Ok(())
            }
            None => Err(DbError::TableNotFound(name.to_string())),
        }
    }

    /// Table names, sorted
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    pub fn describe_table(&self, name: &str) -> Result<TableInfo> {
        let table = self.get_table(name)?;
        Ok(TableInfo {
            name: table.name().to_string(),
            schema: table.schema().clone(),
            primary_key: table.primary_key().map(str::to_string),
            row_count: table.len(),
            indexed_columns: table.indexed_columns(),
        })
    }

    /// Index `column` of `table_name`, backfilling from current rows
    #[instrument(level = "debug", skip(self), fields(table = %table_name))]
    pub fn create_index(&self, table_name: &str, column: &str) -> Result<()> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, table_name)?;
        table.create_index(column)
    }

    /// Validate and append one row
    #[instrument(level = "debug", skip(self, row), fields(table = %table_name))]
    pub fn insert(&self, table_name: &str, row: Row) -> Result<()> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, table_name)?;

        ConstraintChecker::new(table, &self.config).validate_insert(&row)?;
        let position = table.add_row(row);
        debug!(position, "row inserted");
        Ok(())
    }

    /// Rows matching `condition` (all rows if `None`), projected to `columns`
    /// (whole rows if empty), in storage order.
    ///
    /// An equality condition on an indexed column reads candidates from the
    /// index instead of scanning; the condition is re-applied either way.
    #[instrument(level = "debug", skip(self, columns), fields(table = %table_name))]
    pub fn select<S: AsRef<str>>(
        &self,
        table_name: &str,
        columns: &[S],
        condition: Option<&Condition>,
    ) -> Result<Vec<Row>> {
        let table = self.get_table(table_name)?;

        let candidates = Self::candidate_positions(&table, condition);
        let results = candidates
            .into_iter()
            .filter_map(|position| table.row(position))
            .filter(|row| evaluate_condition(row, condition))
            .map(|row| project_row(row, columns))
            .collect();

        Ok(results)
    }

    /// Overlay `updates` on every row matching `condition`.
    ///
    /// Rows are checked one at a time in storage order. The first constraint
    /// violation stops the statement; rows already updated stay updated and
    /// their count is reported in the error.
    #[instrument(level = "debug", skip(self, updates), fields(table = %table_name))]
    pub fn update(
        &self,
        table_name: &str,
        updates: &Row,
        condition: Option<&Condition>,
    ) -> std::result::Result<usize, UpdateError> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, table_name)?;

        let mut rows_affected = 0;
        for position in 0..table.len() {
            let old_row = &table.rows()[position];
            if !evaluate_condition(old_row, condition) {
                continue;
            }

            let mut new_row = old_row.clone();
            new_row.merge_from(updates);

            let checker = ConstraintChecker::new(table, &self.config);
            if let Err(source) = checker.validate_update(old_row, &new_row) {
                debug!(position, rows_affected, "update aborted");
                return Err(UpdateError {
                    rows_affected,
                    source,
                });
            }

            table.update_row(position, new_row);
            rows_affected += 1;
        }

        debug!(rows_affected, "rows updated");
        Ok(rows_affected)
    }

    /// Remove every row matching `condition` (all rows if `None`)
    #[instrument(level = "debug", skip(self), fields(table = %table_name))]
    pub fn delete(&self, table_name: &str, condition: Option<&Condition>) -> Result<usize> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, table_name)?;

        let Some(condition) = condition else {
            let rows_affected = table.truncate();
            debug!(rows_affected, "table emptied");
            return Ok(rows_affected);
        };

        // Walk backwards: swap-remove only ever pulls in a row that was
        // already checked.
        let mut rows_affected = 0;
        for position in (0..table.len()).rev() {
            if condition.matches(&table.rows()[position]) {
                table.delete_row(position);
                rows_affected += 1;
            }
        }

        debug!(rows_affected, "rows deleted");
        Ok(rows_affected)
    }

    /// Candidate positions for `condition`, in storage order
    fn candidate_positions(table: &Table, condition: Option<&Condition>) -> Vec<RowPosition> {
        if let Some(condition) = condition.filter(|c| c.is_equality() && !c.value.is_null()) {
            if let Some(index) = table.get_index(&condition.column) {
                let mut positions = index.lookup(&condition.value).to_vec();
                positions.sort_unstable();
                debug!(column = %condition.column, candidates = positions.len(), "index lookup");
                return positions;
            }
        }

        debug!(rows = table.len(), "full scan");
        (0..table.len()).collect()
    }

    pub(crate) fn read_tables(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        self.tables.read()
    }

    fn table_mut<'t>(
        tables: &'t mut HashMap<String, Table>,
        name: &str,
    ) -> Result<&'t mut Table> {
        tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }
}
