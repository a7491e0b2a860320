//! Row selection, ordering and projection.

use std::cmp::Ordering;

use crate::models::{FrameError, ResultSet, Value};


/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}


impl ResultSet {
    /// Rows whose `column` equals `value`.
    ///
    /// A value absent from the column yields an empty set.
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<ResultSet, FrameError> {
        let idx = self.column_index(column)?;
        let rows = self
            .rows()
            .iter()
            .filter(|row| row[idx].matches(value))
            .cloned()
            .collect();
        Ok(ResultSet::from_parts(self.columns().to_vec(), rows))
    }

    /// Rows whose numeric `column` lies within `[min, max]`.
    ///
    /// Either bound may be open. Null and text cells never match.
    pub fn filter_range(
        &self,
        column: &str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<ResultSet, FrameError> {
        let idx = self.column_index(column)?;
        let rows = self
            .rows()
            .iter()
            .filter(|row| match row[idx].as_f64() {
                Some(v) => min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi),
                None => false,
            })
            .cloned()
            .collect();
        Ok(ResultSet::from_parts(self.columns().to_vec(), rows))
    }

    /// Stable sort on one column. Nulls stay at the end in both directions.
    pub fn sort_by_column(&self, column: &str, order: Order) -> Result<ResultSet, FrameError> {
        let idx = self.column_index(column)?;
        let mut rows = self.rows().to_vec();
        rows.sort_by(|a, b| {
            let (x, y) = (&a[idx], &b[idx]);
            match (x.is_null(), y.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => match order {
                    Order::Ascending => x.total_cmp(y),
                    Order::Descending => y.total_cmp(x),
                },
            }
        });
        Ok(ResultSet::from_parts(self.columns().to_vec(), rows))
    }

    pub fn sort_desc(&self, column: &str) -> Result<ResultSet, FrameError> {
        self.sort_by_column(column, Order::Descending)
    }

    pub fn sort_asc(&self, column: &str) -> Result<ResultSet, FrameError> {
        self.sort_by_column(column, Order::Ascending)
    }

    /// Distinct non-null values of a column in first-appearance order.
    pub fn unique(&self, column: &str) -> Result<Vec<Value>, FrameError> {
        let idx = self.column_index(column)?;
        let mut seen: Vec<Value> = Vec::new();
        for row in self.rows() {
            let v = &row[idx];
            if !v.is_null() && !seen.iter().any(|s| s.matches(v)) {
                seen.push(v.clone());
            }
        }
        Ok(seen)
    }

    /// Project onto the named columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<ResultSet, FrameError> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows()
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(ResultSet::from_parts(
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ))
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> ResultSet {
        let rows = self.rows().iter().take(n).cloned().collect();
        ResultSet::from_parts(self.columns().to_vec(), rows)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> ResultSet {
        let rows = vec![
            ("Alta Bates", "PCI", 2.1),
            ("Kaiser Oakland", "PCI", 3.4),
            ("Alta Bates", "Craniotomy", 7.9),
            ("UCSF", "PCI", 1.2),
            ("Kaiser Oakland", "Craniotomy", 5.0),
            ("Scripps", "PCI", 3.4),
        ];
        ResultSet::new(
            vec!["HOSPITAL_NAME".into(), "PROCEDURE_NAME".into(), "MORTALITY_RATE".into()],
            rows.into_iter()
                .map(|(h, p, r)| vec![Value::from(h), Value::from(p), Value::Float(r)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_filter_then_sort_desc_is_non_increasing() {
        let sorted = rates()
            .filter_eq("PROCEDURE_NAME", &Value::from("PCI"))
            .unwrap()
            .sort_desc("MORTALITY_RATE")
            .unwrap();

        assert_eq!(sorted.len(), 4);
        let values: Vec<f64> = sorted
            .column("MORTALITY_RATE")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_f64())
            .collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let sorted = rates().sort_desc("MORTALITY_RATE").unwrap();
        let names: Vec<String> = sorted
            .column("HOSPITAL_NAME")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        // Kaiser Oakland (PCI) precedes Scripps in the source
        assert_eq!(&names[2..4], &["Kaiser Oakland", "Scripps"]);
    }

    #[test]
    fn test_missing_value_selects_nothing() {
        let result = rates()
            .filter_eq("PROCEDURE_NAME", &Value::from("Heart Transplant"))
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), rates().columns());
    }

    #[test]
    fn test_unknown_column_is_error() {
        let err = rates().filter_eq("COUNTY", &Value::from("Alameda")).unwrap_err();
        assert!(matches!(err, FrameError::UnknownColumn { .. }));
    }

    #[test]
    fn test_nulls_sort_last_in_both_directions() {
        let rs = ResultSet::new(
            vec!["X".into()],
            vec![vec![Value::Null], vec![Value::Int(1)], vec![Value::Int(3)]],
        )
        .unwrap();
        let desc = rs.sort_desc("X").unwrap();
        assert_eq!(desc.rows()[0][0], Value::Int(3));
        assert!(desc.rows()[2][0].is_null());
        let asc = rs.sort_asc("X").unwrap();
        assert_eq!(asc.rows()[0][0], Value::Int(1));
        assert!(asc.rows()[2][0].is_null());
    }

    #[test]
    fn test_filter_range_inclusive() {
        let result = rates().filter_range("MORTALITY_RATE", Some(2.1), Some(5.0)).unwrap();
        assert_eq!(result.len(), 4);
        let open = rates().filter_range("MORTALITY_RATE", Some(5.0), None).unwrap();
        assert_eq!(open.len(), 2);
        let none = rates().filter_range("HOSPITAL_NAME", Some(0.0), None).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_unique_keeps_first_appearance_order() {
        let hospitals = rates().unique("HOSPITAL_NAME").unwrap();
        assert_eq!(
            hospitals,
            vec![
                Value::from("Alta Bates"),
                Value::from("Kaiser Oakland"),
                Value::from("UCSF"),
                Value::from("Scripps"),
            ]
        );
    }

    #[test]
    fn test_select_and_head() {
        let rs = rates().select(&["MORTALITY_RATE", "HOSPITAL_NAME"]).unwrap().head(2);
        assert_eq!(rs.columns(), &["MORTALITY_RATE", "HOSPITAL_NAME"]);
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.rows()[0][1], Value::from("Alta Bates"));
    }
}
