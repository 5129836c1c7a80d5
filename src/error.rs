use crate::types::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("column '{column}' does not exist in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("primary key violation in table '{table}': duplicate value '{value}' for key '{column}'")]
    PrimaryKeyViolation {
        table: String,
        column: String,
        value: Value,
    },

    #[error("unique constraint violation in table '{table}': duplicate value '{value}' for column '{column}'")]
    UniqueViolation {
        table: String,
        column: String,
        value: Value,
    },

    #[error("missing required column '{column}' in table '{table}'")]
    MissingRequiredColumn { table: String, column: String },

    #[error(
        "invalid value for column '{column}' in table '{table}': expected {expected}, got {} '{got}'",
        .got.type_name()
    )]
    InvalidValueType {
        table: String,
        column: String,
        expected: String,
        got: Value,
    },

    #[error("table '{table}' cannot have multiple primary keys")]
    MultiplePrimaryKeys { table: String },

    #[error("column '{column}' declared more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("table limit reached: at most {limit} tables")]
    TableLimitReached { limit: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DbError {
    /// Table the error refers to, when it refers to one
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::TableNotFound(t) | Self::TableAlreadyExists(t) => Some(t),
            Self::ColumnNotFound { table, .. }
            | Self::PrimaryKeyViolation { table, .. }
            | Self::UniqueViolation { table, .. }
            | Self::MissingRequiredColumn { table, .. }
            | Self::InvalidValueType { table, .. }
            | Self::MultiplePrimaryKeys { table }
            | Self::DuplicateColumn { table, .. } => Some(table),
            Self::TableLimitReached { .. } | Self::InvalidConfig(_) => None,
        }
    }

    /// True for errors raised by the constraint checker
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::PrimaryKeyViolation { .. }
                | Self::UniqueViolation { .. }
                | Self::MissingRequiredColumn { .. }
                | Self::InvalidValueType { .. }
        )
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// A multi-row update that stopped partway.
///
/// The first `rows_affected` matching rows were updated and stay updated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{source} ({rows_affected} rows updated before the failure)")]
pub struct UpdateError {
    pub rows_affected: usize,
    #[source]
    pub source: DbError,
}

impl From<DbError> for UpdateError {
    fn from(source: DbError) -> Self {
        UpdateError {
            rows_affected: 0,
            source,
        }
    }
}
