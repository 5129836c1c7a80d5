//! Schema model for tables
//!
//! A schema is an ordered list of column descriptors. Primary-key and unique
//! columns are always indexed by the owning table.

use crate::error::{DbError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Int,
    String,
    Bool,
}

impl ColumnType {
    /// Check if a value matches this type. `Null` matches every type; the
    /// not-null phase of the checker handles missing values.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (ColumnType::Int, Value::Int(_))
                | (ColumnType::String, Value::Str(_))
                | (ColumnType::Bool, Value::Bool(_))
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::String => "STRING",
            ColumnType::Bool => "BOOL",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column definition within a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub not_null: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            name: name.into(),
            column_type,
            primary_key: false,
            unique: false,
            not_null: false,
        }
    }

    /// Mark as primary key. A primary key is implicitly NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Whether a value is mandatory for this column
    pub fn is_required(&self) -> bool {
        self.not_null || self.primary_key
    }

    /// Whether the owning table keeps an index for this column from creation
    pub fn is_auto_indexed(&self) -> bool {
        self.primary_key || self.unique
    }
}

/// Table-level schema: columns in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    /// Add a column to the schema
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Builder form of [`Schema::add_column`]
    pub fn with_column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get column definition by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Name of the primary-key column, if any
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reject schemas that name a column twice or declare more than one
    /// primary key.
    pub fn validate(&self, table: &str) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::DuplicateColumn {
                    table: table.to_string(),
                    column: column.name.clone(),
                });
            }
        }

        if self.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(DbError::MultiplePrimaryKeys {
                table: table.to_string(),
            });
        }

        Ok(())
    }
}

impl FromIterator<Column> for Schema {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Schema::new(iter.into_iter().collect())
    }
}
