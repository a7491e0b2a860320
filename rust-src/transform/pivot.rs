//! Long-to-wide reshaping and its inverse.

use serde::Serialize;

use crate::models::{FrameError, ResultSet, Value};


/// Wide-form matrix keyed by two columns of a long-form result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub index_name: String,
    pub columns_name: String,
    pub values_name: String,
    pub row_keys: Vec<Value>,
    pub col_keys: Vec<Value>,
    /// `cells[row][col]`; `None` where the long form had no entry.
    pub cells: Vec<Vec<Option<Value>>>,
}


impl ResultSet {
    /// Pivot rows=`index`, columns=`columns`, cells=`values`.
    ///
    /// Keys are sorted ascending. Two rows sharing an (index, column) pair
    /// are rejected with `DuplicateEntry`.
    pub fn pivot(&self, index: &str, columns: &str, values: &str) -> Result<PivotTable, FrameError> {
        let ii = self.column_index(index)?;
        let ci = self.column_index(columns)?;
        let vi = self.column_index(values)?;

        let row_keys = sorted_keys(self.rows().iter().map(|r| &r[ii]));
        let col_keys = sorted_keys(self.rows().iter().map(|r| &r[ci]));

        let mut cells = vec![vec![None; col_keys.len()]; row_keys.len()];

        for row in self.rows() {
            let (Some(r), Some(c)) = (key_position(&row_keys, &row[ii]), key_position(&col_keys, &row[ci])) else {
                // Null keys are dropped
                continue;
            };
            let slot = &mut cells[r][c];
            if slot.is_some() {
                return Err(FrameError::DuplicateEntry {
                    index: row[ii].to_string(),
                    column: row[ci].to_string(),
                });
            }
            *slot = Some(row[vi].clone());
        }

        Ok(PivotTable {
            index_name: index.to_string(),
            columns_name: columns.to_string(),
            values_name: values.to_string(),
            row_keys,
            col_keys,
            cells,
        })
    }
}


impl PivotTable {
    /// Back to long form: one row per filled cell, columns
    /// `[index, columns, values]`.
    #[allow(dead_code)]
    pub fn melt(&self) -> ResultSet {
        let mut rows = Vec::new();
        for (r, row_key) in self.row_keys.iter().enumerate() {
            for (c, col_key) in self.col_keys.iter().enumerate() {
                if let Some(v) = &self.cells[r][c] {
                    rows.push(vec![row_key.clone(), col_key.clone(), v.clone()]);
                }
            }
        }
        ResultSet::from_parts(
            vec![
                self.index_name.clone(),
                self.columns_name.clone(),
                self.values_name.clone(),
            ],
            rows,
        )
    }

    /// Wide display form: the index column followed by one column per key.
    pub fn to_result_set(&self) -> ResultSet {
        let mut columns = vec![self.index_name.clone()];
        columns.extend(self.col_keys.iter().map(|k| k.to_string()));

        let rows = self
            .row_keys
            .iter()
            .zip(&self.cells)
            .map(|(key, cells)| {
                let mut row = vec![key.clone()];
                row.extend(cells.iter().map(|c| c.clone().unwrap_or(Value::Null)));
                row
            })
            .collect();

        ResultSet::from_parts(columns, rows)
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }
}


fn sorted_keys<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut keys: Vec<Value> = values.filter(|v| !v.is_null()).cloned().collect();
    keys.sort_by(|a, b| a.total_cmp(b));
    keys.dedup_by(|a, b| a.matches(b));
    keys
}


fn key_position(keys: &[Value], value: &Value) -> Option<usize> {
    if value.is_null() {
        return None;
    }
    keys.binary_search_by(|k| k.total_cmp(value)).ok()
}
