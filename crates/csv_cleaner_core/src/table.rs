use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

/// A single decoded cell.
///
/// Numbers compare and hash by their canonical bit pattern, so `-0.0` and `0.0`
/// are the same value. NaN never appears as a number: [`Value::number`] maps it
/// to [`Value::Null`].
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
    Null,
}

impl Value {
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Self::Null
        } else {
            Self::Number(value)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn canonical_bits(value: f64) -> u64 {
        if value == 0.0 {
            0.0f64.to_bits()
        } else {
            value.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => {
                Self::canonical_bits(*left) == Self::canonical_bits(*right)
            }
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Text(text) => text.hash(state),
            Self::Number(number) => Self::canonical_bits(*number).hash(state),
            Self::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

pub type Row = Vec<Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row {row_index} has {actual} values but the table has {expected} columns")]
    RaggedRow {
        row_index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Rectangular, ordered collection of rows sharing one column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, TableError> {
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RaggedRow {
                    row_index,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table with the same columns as `self` from rows already known
    /// to have the right width.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row_index: usize, column: &str) -> Option<&Value> {
        let column_index = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row_index).map(|row| &row[column_index])
    }

    pub fn row_map(&self, row_index: usize) -> Option<BTreeMap<&str, &Value>> {
        let row = self.rows.get(row_index)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect(),
        )
    }
}
