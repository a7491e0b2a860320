//! Group-by aggregation over result sets.

use crate::models::{FrameError, ResultSet, Value};


/// Running sum that stays integral until a float shows up.
#[derive(Debug, Clone, Copy)]
enum Sum {
    Int(i64),
    Float(f64),
}


impl Sum {
    fn add(self, v: &Value) -> Sum {
        match (self, v) {
            // Past i64 range the sum continues as a float
            (Sum::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map_or(Sum::Float(a as f64 + *b as f64), Sum::Int),
            (Sum::Int(a), Value::Float(b)) => Sum::Float(a as f64 + b),
            (Sum::Float(a), other) => Sum::Float(a + other.as_f64().unwrap_or(0.0)),
            // Null and text contribute nothing
            (s, _) => s,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Sum::Int(i) => Value::Int(i),
            Sum::Float(f) => Value::Float(f),
        }
    }
}


impl ResultSet {
    /// Sum `value` per distinct `key`, groups sorted ascending by key.
    ///
    /// Rows with a null key are dropped.
    pub fn sum_by(&self, key: &str, value: &str) -> Result<ResultSet, FrameError> {
        let ki = self.column_index(key)?;
        let vi = self.column_index(value)?;

        let mut groups: Vec<(Value, Sum)> = Vec::new();
        for row in self.rows() {
            let k = &row[ki];
            if k.is_null() {
                continue;
            }
            match groups.iter_mut().find(|(g, _)| g.matches(k)) {
                Some((_, sum)) => *sum = sum.add(&row[vi]),
                None => groups.push((k.clone(), Sum::Int(0).add(&row[vi]))),
            }
        }

        groups.sort_by(|a, b| a.0.total_cmp(&b.0));

        let rows = groups
            .into_iter()
            .map(|(k, s)| vec![k, s.into_value()])
            .collect();

        Ok(ResultSet::from_parts(
            vec![key.to_string(), value.to_string()],
            rows,
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn trend() -> ResultSet {
        let rows = vec![
            (2020, "PCI", 120),
            (2019, "PCI", 100),
            (2020, "Craniotomy", 30),
            (2019, "Craniotomy", 25),
        ];
        ResultSet::new(
            vec!["RPT_YEAR".into(), "PROCEDURE_NAME".into(), "CASE_COUNT".into()],
            rows.into_iter()
                .map(|(y, p, c)| vec![Value::Int(y), Value::from(p), Value::Int(c)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_sum_by_year() {
        let totals = trend().sum_by("RPT_YEAR", "CASE_COUNT").unwrap();
        assert_eq!(totals.columns(), &["RPT_YEAR", "CASE_COUNT"]);
        assert_eq!(
            totals.rows(),
            &[
                vec![Value::Int(2019), Value::Int(125)],
                vec![Value::Int(2020), Value::Int(150)],
            ]
        );
    }

    #[test]
    fn test_integer_overflow_continues_as_float() {
        let rs = ResultSet::new(
            vec!["K".into(), "V".into()],
            vec![
                vec![Value::from("a"), Value::Int(i64::MAX)],
                vec![Value::from("a"), Value::Int(1)],
            ],
        )
        .unwrap();
        let totals = rs.sum_by("K", "V").unwrap();
        assert_eq!(totals.rows()[0][1], Value::Float(i64::MAX as f64 + 1.0));
        assert!(matches!(totals.rows()[0][1], Value::Float(_)));
    }

    #[test]
    fn test_float_promotes_sum() {
        let rs = ResultSet::new(
            vec!["K".into(), "V".into()],
            vec![
                vec![Value::from("a"), Value::Int(1)],
                vec![Value::from("a"), Value::Float(0.5)],
                vec![Value::from("a"), Value::Null],
            ],
        )
        .unwrap();
        let totals = rs.sum_by("K", "V").unwrap();
        assert_eq!(totals.rows()[0][1], Value::Float(1.5));
    }

    #[test]
    fn test_empty_input() {
        let totals = trend()
            .filter_eq("PROCEDURE_NAME", &Value::from("none"))
            .unwrap()
            .sum_by("RPT_YEAR", "CASE_COUNT")
            .unwrap();
        assert!(totals.is_empty());
    }
}
