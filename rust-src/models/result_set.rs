//! In-memory tabular result set materialized from a warehouse view.

use serde::Serialize;
use thiserror::Error;

use super::Value;


/// Errors raised by result set transforms.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("column '{column}' not found (available: {available})")]
    UnknownColumn { column: String, available: String },

    #[error("duplicate entry for ({index}, {column}) while pivoting")]
    DuplicateEntry { index: String, column: String },

    #[error("row has {got} cells, expected {expected}")]
    RowWidth { expected: usize, got: usize },
}


/// Rows of typed cells under ordered column names.
///
/// Never mutated after construction; every transform returns a new set.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}


impl ResultSet {
    /// Build a result set, checking every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, FrameError> {
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(FrameError::RowWidth {
                expected: columns.len(),
                got: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// An empty result set with the same columns.
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or `UnknownColumn`.
    pub fn column_index(&self, name: &str) -> Result<usize, FrameError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FrameError::UnknownColumn {
                column: name.to_string(),
                available: self.columns.join(", "),
            })
    }

    /// All cells of one column, top to bottom.
    #[allow(dead_code)]
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, FrameError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }
}
