//! Tabledb - Embeddable In-Memory Table Store
//!
//! Named tables with typed schemas, primary-key / unique / not-null
//! constraints, hash indexes and equality inner joins. Callers hand the
//! engine already-structured commands (table name, columns, typed values, a
//! single condition) and get rows or typed errors back; there is no query
//! text parsing and no persistence.
//!
//! # Architecture
//!
//! - Value/Row layer: tagged scalar values, insertion-ordered rows
//! - Schema layer: column descriptors and creation-time validation
//! - Index layer: value -> row positions hash index per column
//! - Table layer: dense row storage with swap-remove and synchronized indexes
//! - Constraint layer: ordered primary-key / unique / not-null / type checks
//! - Database layer: table registry and CRUD under one reader/writer lock
//! - Join layer: index-assisted equality inner join

pub mod types;
pub mod schema;
pub mod error;
pub mod config;

// Storage modules
pub mod index;
pub mod table;
pub mod constraints;

// Query modules
pub mod executor;
pub mod database;
pub mod join;

pub use types::{Row, Value};
pub use schema::{Column, ColumnType, Schema};
pub use error::{DbError, UpdateError};
pub use config::DatabaseConfig;

// Storage exports
pub use index::{HashIndex, RowPosition};
pub use table::Table;
pub use constraints::ConstraintChecker;

// Query exports
pub use executor::{evaluate_condition, project_row, Condition, Operator};
pub use database::{Database, TableInfo};
pub use join::{qualified_name, JoinCondition};
