//! Row filtering and projection
//!
//! A [`Condition`] is a single `column <op> value` predicate. Ordering
//! operators only match between two integers or two strings; any other pair
//! is unorderable and the predicate is false, for `<=`/`>=` as well.

use crate::types::{Row, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a WHERE condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::GtEq => ">=",
            Operator::LtEq => "<=",
        }
    }

    /// Parse a comparison symbol such as `">="`
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::NotEq),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            ">=" => Some(Operator::GtEq),
            "<=" => Some(Operator::LtEq),
            _ => None,
        }
    }

    /// Apply the operator to a pair of values
    pub fn compare(&self, left: &Value, right: &Value) -> bool {
        match self {
            Operator::Eq => left == right,
            Operator::NotEq => left != right,
            Operator::Gt => left.partial_order(right).is_some_and(|o| o.is_gt()),
            Operator::Lt => left.partial_order(right).is_some_and(|o| o.is_lt()),
            Operator::GtEq => left.partial_order(right).is_some_and(|o| o.is_ge()),
            Operator::LtEq => left.partial_order(right).is_some_and(|o| o.is_le()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// WHERE condition: `column <operator> value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Condition {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    /// Whether this condition can be answered by an equality index lookup
    pub fn is_equality(&self) -> bool {
        self.operator == Operator::Eq
    }

    /// Evaluate against a row. A column absent from the row never matches.
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            Some(value) => self.operator.compare(value, &self.value),
            None => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.value)
    }
}

/// True when there is no condition or the row satisfies it
pub fn evaluate_condition(row: &Row, condition: Option<&Condition>) -> bool {
    condition.map_or(true, |c| c.matches(row))
}

/// Copy `row`, keeping only `columns` (in the requested order) that exist.
///
/// An empty column list keeps the whole row.
pub fn project_row<S: AsRef<str>>(row: &Row, columns: &[S]) -> Row {
    if columns.is_empty() {
        return row.clone();
    }

    let mut projected = Row::with_capacity(columns.len());
    for column in columns {
        let column = column.as_ref();
        if let Some(value) = row.get(column) {
            projected.set(column, value.clone());
        }
    }
    projected
}
