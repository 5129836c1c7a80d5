//! Equality inner join between two tables
//!
//! Output rows carry table-qualified keys (`table.column`) for every column
//! of both sides, whether or not names collide.

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::executor::project_row;
use crate::table::Table;
use crate::types::Row;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// `left.left_column = right.right_column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    pub left_column: String,
    pub right_column: String,
}

impl JoinCondition {
    pub fn new(left_column: impl Into<String>, right_column: impl Into<String>) -> Self {
        JoinCondition {
            left_column: left_column.into(),
            right_column: right_column.into(),
        }
    }
}

/// `table.column`
pub fn qualified_name(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

impl Database {
    /// Inner join of `left_table` and `right_table` on equal, non-null values.
    ///
    /// Left rows are visited in storage order. Matches for a left row come
    /// from the right table's index on the join column when one exists, and
    /// from a scan of the right table otherwise. Both tables are read under
    /// one shared lock. `select_columns` (qualified names) projects the
    /// output; empty keeps every column.
    #[instrument(level = "debug", skip(self, select_columns), fields(left = %left_table, right = %right_table))]
    pub fn inner_join<S: AsRef<str>>(
        &self,
        left_table: &str,
        right_table: &str,
        condition: &JoinCondition,
        select_columns: &[S],
    ) -> Result<Vec<Row>> {
        let tables = self.read_tables();
        let left = tables
            .get(left_table)
            .ok_or_else(|| DbError::TableNotFound(left_table.to_string()))?;
        let right = tables
            .get(right_table)
            .ok_or_else(|| DbError::TableNotFound(right_table.to_string()))?;

        require_column(left, &condition.left_column)?;
        require_column(right, &condition.right_column)?;

        debug!(
            indexed = right.get_index(&condition.right_column).is_some(),
            "join strategy"
        );

        let mut results = Vec::new();
        for left_row in left.rows() {
            let left_value = left_row.value_or_null(&condition.left_column);
            if left_value.is_null() {
                continue;
            }

            let matches = right.positions_with_value(&condition.right_column, left_value);
            for right_row in matches.into_iter().filter_map(|p| right.row(p)) {
                let merged = merge_rows(left_row, right_row, left_table, right_table);
                results.push(if select_columns.is_empty() {
                    merged
                } else {
                    project_row(&merged, select_columns)
                });
            }
        }

        debug!(rows = results.len(), "join complete");
        Ok(results)
    }
}

fn require_column(table: &Table, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(DbError::ColumnNotFound {
            table: table.name().to_string(),
            column: column.to_string(),
        })
    }
}

/// Left cells then right cells, each key prefixed with its table name
fn merge_rows(left: &Row, right: &Row, left_table: &str, right_table: &str) -> Row {
    let mut merged = Row::with_capacity(left.len() + right.len());
    for (column, value) in left.iter() {
        merged.set(qualified_name(left_table, column), value.clone());
    }
    for (column, value) in right.iter() {
        merged.set(qualified_name(right_table, column), value.clone());
    }
    merged
}
