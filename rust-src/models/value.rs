//! Cell values for warehouse result sets.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};


/// A single typed cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}


impl Value {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total ordering used by sorts and pivot keys.
    ///
    /// Numbers sort before text and nulls sort last. Ints and floats
    /// compare numerically.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Text(_), _) => Ordering::Greater,
            (_, Value::Text(_)) => Ordering::Less,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (a, b) => {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
        }
    }

    /// Selection equality. Null never matches anything.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Parse user input into the most specific value type.
    ///
    /// Used by CLI selectors so `--year 2021` matches an integer column.
    pub fn parse_input(s: &str) -> Value {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(s.to_string())
    }
}


impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            _ => self.matches(other),
        }
    }
}


impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}


impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_float_compare_numerically() {
        assert!(Value::Int(2021).matches(&Value::Float(2021.0)));
        assert_eq!(Value::Int(3).total_cmp(&Value::Float(2.5)), Ordering::Greater);
    }

    #[test]
    fn test_null_never_matches() {
        assert!(!Value::Null.matches(&Value::Null));
        assert!(!Value::Null.matches(&Value::Int(0)));
    }

    #[test]
    fn test_ordering_puts_null_last_and_text_after_numbers() {
        let mut values = vec![
            Value::Null,
            Value::from("b"),
            Value::Int(5),
            Value::from("a"),
            Value::Float(1.5),
        ];
        values.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(
            values,
            vec![
                Value::Float(1.5),
                Value::Int(5),
                Value::from("a"),
                Value::from("b"),
                Value::Null,
            ]
        );
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(Value::parse_input("2021"), Value::Int(2021));
        assert_eq!(Value::parse_input("1.25"), Value::Float(1.25));
        assert_eq!(Value::parse_input("As Expected"), Value::from("As Expected"));
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Null,
            Value::Int(1),
            Value::Float(2.5),
            Value::from("x"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1,2.5,"x"]"#);
    }
}
