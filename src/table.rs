//! Table storage
//!
//! Rows live in a dense vector addressed by position. Every index is kept in
//! step with the vector inside the same `&mut self` call that changes it.
//!
//! Deletion is a swap-remove: the last row moves into the vacated slot, so
//! row order is not preserved across deletes and a position is not a stable
//! row identity.

use crate::error::{DbError, Result};
use crate::index::{HashIndex, RowPosition};
use crate::schema::{Column, Schema};
use crate::types::{Row, Value};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
    primary_key: Option<String>,
    indexes: HashMap<String, HashIndex>,
}

impl Table {
    /// Create an empty table. Primary-key and unique columns get an index
    /// immediately.
    pub fn new(name: impl Into<String>, schema: Schema) -> Result<Self> {
        let name = name.into();
        schema.validate(&name)?;

        let primary_key = schema.primary_key().map(str::to_string);
        let indexes = schema
            .columns()
            .iter()
            .filter(|c| c.is_auto_indexed())
            .map(|c| (c.name.clone(), HashIndex::new(c.name.clone())))
            .collect();

        Ok(Table {
            name,
            schema,
            rows: Vec::new(),
            primary_key,
            indexes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        self.schema.columns()
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, position: RowPosition) -> Option<&Row> {
        self.rows.get(position)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.schema.has_column(column)
    }

    pub fn get_index(&self, column: &str) -> Option<&HashIndex> {
        self.indexes.get(column)
    }

    /// Indexed column names, sorted
    pub fn indexed_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.indexes.keys().cloned().collect();
        columns.sort();
        columns
    }

    /// Create an index on `column`, backfilled from the current rows.
    ///
    /// Succeeds without doing anything if the column is already indexed.
    pub fn create_index(&mut self, column: &str) -> Result<()> {
        if !self.has_column(column) {
            return Err(DbError::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }
        if self.indexes.contains_key(column) {
            return Ok(());
        }

        let mut index = HashIndex::new(column);
        for (position, row) in self.rows.iter().enumerate() {
            if let Some(value) = row.get(column) {
                index.add(value, position);
            }
        }

        debug!(
            table = %self.name,
            column,
            rows = self.rows.len(),
            "index created"
        );
        self.indexes.insert(column.to_string(), index);
        Ok(())
    }

    /// Whether a row already holds `value` in the primary-key column
    pub fn has_primary_key_value(&self, value: &Value) -> bool {
        match &self.primary_key {
            Some(pk) => self.has_unique_value(pk, value),
            None => false,
        }
    }

    /// Whether a row already holds `value` in `column`. Null never counts.
    ///
    /// Uses the column's index when present, otherwise scans.
    pub fn has_unique_value(&self, column: &str, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }
        match self.indexes.get(column) {
            Some(index) => index.has(value),
            None => self.rows.iter().any(|row| row.get(column) == Some(value)),
        }
    }

    /// Positions of the rows holding `value` in `column`, by index or scan
    pub fn positions_with_value(&self, column: &str, value: &Value) -> Vec<RowPosition> {
        if value.is_null() {
            return Vec::new();
        }
        match self.indexes.get(column) {
            Some(index) => index.lookup(value).to_vec(),
            None => self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row.get(column) == Some(value))
                .map(|(position, _)| position)
                .collect(),
        }
    }

    /// Append a row and register it with every index
    pub fn add_row(&mut self, row: Row) -> RowPosition {
        let position = self.rows.len();
        for (column, index) in self.indexes.iter_mut() {
            if let Some(value) = row.get(column) {
                index.add(value, position);
            }
        }
        self.rows.push(row);
        position
    }

    /// Replace the row at `position`, returning the previous row.
    ///
    /// Only indexes whose column value changed are touched. Returns `None`
    /// and changes nothing if `position` is out of range.
    pub fn update_row(&mut self, position: RowPosition, new_row: Row) -> Option<Row> {
        let old_row = self.rows.get(position)?;
        for (column, index) in self.indexes.iter_mut() {
            let old_value = old_row.value_or_null(column);
            let new_value = new_row.value_or_null(column);
            if old_value != new_value {
                index.update(old_value, new_value, position);
            }
        }
        Some(std::mem::replace(&mut self.rows[position], new_row))
    }

    /// Swap-remove the row at `position`, returning it.
    ///
    /// The last row takes over `position` and every index entry pointing at
    /// the old last position is rewritten. Returns `None` and changes nothing
    /// if `position` is out of range.
    pub fn delete_row(&mut self, position: RowPosition) -> Option<Row> {
        let removed = self.rows.get(position)?;
        for (column, index) in self.indexes.iter_mut() {
            index.remove(removed.value_or_null(column), position);
        }

        let last = self.rows.len() - 1;
        let removed = self.rows.swap_remove(position);
        if position != last {
            let moved = &self.rows[position];
            for (column, index) in self.indexes.iter_mut() {
                index.relocate(moved.value_or_null(column), last, position);
            }
        }
        Some(removed)
    }

    /// Remove every row, keeping the schema and the (emptied) indexes
    pub fn truncate(&mut self) -> usize {
        let count = self.rows.len();
        self.rows.clear();
        for index in self.indexes.values_mut() {
            index.clear();
        }
        count
    }
}
