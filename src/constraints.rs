//! Constraint checking for row writes
//!
//! Phases run in a fixed order and the first violation wins, scanning
//! columns in declaration order within each phase:
//!
//! 1. primary key (present, then not duplicated)
//! 2. unique columns other than the primary key
//! 3. not-null / primary-key presence
//! 4. unknown columns, when the config forbids them
//! 5. value types, when the config enforces them

use crate::config::DatabaseConfig;
use crate::error::{DbError, Result};
use crate::table::Table;
use crate::types::{Row, Value};

/// Stateless validator bound to one table
pub struct ConstraintChecker<'a> {
    table: &'a Table,
    config: &'a DatabaseConfig,
}

impl<'a> ConstraintChecker<'a> {
    pub fn new(table: &'a Table, config: &'a DatabaseConfig) -> Self {
        ConstraintChecker { table, config }
    }

    /// Check that `row` can be appended to the table
    pub fn validate_insert(&self, row: &Row) -> Result<()> {
        if let Some(pk) = self.table.primary_key() {
            let value = row.value_or_null(pk);
            if value.is_null() {
                return Err(self.missing(pk));
            }
            if self.table.has_primary_key_value(value) {
                return Err(DbError::PrimaryKeyViolation {
                    table: self.table.name().to_string(),
                    column: pk.to_string(),
                    value: value.clone(),
                });
            }
        }

        for column in self.unique_columns() {
            let value = row.value_or_null(column);
            if self.table.has_unique_value(column, value) {
                return Err(self.unique_violation(column, value));
            }
        }

        self.validate_shape(row)
    }

    /// Check that `old_row` may be replaced by `new_row`.
    ///
    /// Existence checks are skipped for values that did not change, so a
    /// row never conflicts with itself.
    pub fn validate_update(&self, old_row: &Row, new_row: &Row) -> Result<()> {
        if let Some(pk) = self.table.primary_key() {
            let old_value = old_row.value_or_null(pk);
            let new_value = new_row.value_or_null(pk);
            if new_value.is_null() {
                return Err(self.missing(pk));
            }
            if old_value != new_value && self.table.has_primary_key_value(new_value) {
                return Err(DbError::PrimaryKeyViolation {
                    table: self.table.name().to_string(),
                    column: pk.to_string(),
                    value: new_value.clone(),
                });
            }
        }

        for column in self.unique_columns() {
            let old_value = old_row.value_or_null(column);
            let new_value = new_row.value_or_null(column);
            if old_value != new_value && self.table.has_unique_value(column, new_value) {
                return Err(self.unique_violation(column, new_value));
            }
        }

        self.validate_shape(new_row)
    }

    /// Phases 3 to 5, shared by insert and update
    fn validate_shape(&self, row: &Row) -> Result<()> {
        for column in self.table.columns().iter().filter(|c| c.is_required()) {
            if row.value_or_null(&column.name).is_null() {
                return Err(self.missing(&column.name));
            }
        }

        if !self.config.allow_unknown_columns {
            if let Some(unknown) = row.columns().find(|c| !self.table.has_column(c)) {
                return Err(DbError::ColumnNotFound {
                    table: self.table.name().to_string(),
                    column: unknown.to_string(),
                });
            }
        }

        if self.config.enforce_column_types {
            for column in self.table.columns() {
                let value = row.value_or_null(&column.name);
                if !column.column_type.matches(value) {
                    return Err(DbError::InvalidValueType {
                        table: self.table.name().to_string(),
                        column: column.name.clone(),
                        expected: column.column_type.name().to_string(),
                        got: value.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn unique_columns(&self) -> impl Iterator<Item = &'a str> + 'a {
        let table = self.table;
        table
            .columns()
            .iter()
            .filter(|c| c.unique && !c.primary_key)
            .map(|c| c.name.as_str())
    }

    fn missing(&self, column: &str) -> DbError {
        DbError::MissingRequiredColumn {
            table: self.table.name().to_string(),
            column: column.to_string(),
        }
    }

    fn unique_violation(&self, column: &str, value: &Value) -> DbError {
        DbError::UniqueViolation {
            table: self.table.name().to_string(),
            column: column.to_string(),
            value: value.clone(),
        }
    }
}
