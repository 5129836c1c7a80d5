//! Hash Index Implementation
//!
//! Maps a column value to the positions of the rows holding it. Lookups are
//! O(1) on average; null values are never indexed.

use crate::types::Value;
use std::collections::HashMap;

/// Position of a row in its table's dense storage
pub type RowPosition = usize;

/// Hash index over one column of one table
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    /// Indexed column
    column: String,
    /// Value to row positions, in insertion order within each bucket
    data: HashMap<Value, Vec<RowPosition>>,
}

impl HashIndex {
    /// Create a new empty index
    pub fn new(column: impl Into<String>) -> Self {
        HashIndex {
            column: column.into(),
            data: HashMap::new(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Record that the row at `position` holds `value`. Null is ignored.
    pub fn add(&mut self, value: &Value, position: RowPosition) {
        if value.is_null() {
            return;
        }
        self.data.entry(value.clone()).or_default().push(position);
    }

    /// Drop `position` from the bucket of `value`; an emptied bucket is removed
    pub fn remove(&mut self, value: &Value, position: RowPosition) {
        if let Some(positions) = self.data.get_mut(value) {
            positions.retain(|p| *p != position);
            if positions.is_empty() {
                self.data.remove(value);
            }
        }
    }

    /// Positions holding `value`, empty for null or unknown values
    pub fn lookup(&self, value: &Value) -> &[RowPosition] {
        if value.is_null() {
            return &[];
        }
        self.data.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move `position` from the bucket of `old` to the bucket of `new`
    pub fn update(&mut self, old: &Value, new: &Value, position: RowPosition) {
        self.remove(old, position);
        self.add(new, position);
    }

    /// Whether any row holds `value`. Always false for null.
    pub fn has(&self, value: &Value) -> bool {
        !value.is_null() && self.data.contains_key(value)
    }

    /// Rewrite `from` to `to` in the bucket of `value`
    pub fn relocate(&mut self, value: &Value, from: RowPosition, to: RowPosition) {
        if let Some(positions) = self.data.get_mut(value) {
            for p in positions.iter_mut().filter(|p| **p == from) {
                *p = to;
            }
        }
    }

    /// Number of distinct indexed values
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Total number of indexed positions
    pub fn total_entries(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
