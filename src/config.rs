//! Engine configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Reject values whose type does not match the column's declared type
    pub enforce_column_types: bool,
    /// Accept inserted/updated columns that are not part of the schema
    pub allow_unknown_columns: bool,
    /// Maximum number of tables (None = unlimited)
    pub max_tables: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            enforce_column_types: true,
            allow_unknown_columns: true,
            max_tables: None,
        }
    }
}

impl DatabaseConfig {
    /// Parse a JSON configuration; omitted fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
