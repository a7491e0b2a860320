//! Qualified table identifiers (`DATABASE.SCHEMA.TABLE`).

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::WarehouseError;


static IDENT_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("valid identifier regex"));


/// A fully resolved table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub database: String,
    pub schema: String,
    pub table: String,
}


impl TableName {
    /// Resolve `TABLE`, `SCHEMA.TABLE` or `DATABASE.SCHEMA.TABLE` against
    /// the session's namespace.
    ///
    /// Names pointing at another database or schema are rejected; the
    /// comparison ignores ASCII case.
    pub fn resolve(identifier: &str, database: &str, schema: &str) -> Result<Self, WarehouseError> {
        let parts: Vec<&str> = identifier.split('.').collect();
        if parts.is_empty() || parts.len() > 3 || !parts.iter().all(|p| IDENT_PART.is_match(p)) {
            return Err(WarehouseError::InvalidIdentifier(identifier.to_string()));
        }

        let (db, sch, table) = match parts.as_slice() {
            [t] => (database, schema, *t),
            [s, t] => (database, *s, *t),
            [d, s, t] => (*d, *s, *t),
            _ => unreachable!("length checked above"),
        };

        if !db.eq_ignore_ascii_case(database) || !sch.eq_ignore_ascii_case(schema) {
            return Err(WarehouseError::UnknownNamespace {
                identifier: identifier.to_string(),
                expected: format!("{database}.{schema}"),
            });
        }

        Ok(Self {
            database: database.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }
}


impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}
