//! SQLite-backed warehouse.

use std::sync::Mutex;
use std::time::Instant;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};

use crate::config::WarehouseConfig;
use crate::models::{ResultSet, Value};

use super::{TableName, Warehouse, WarehouseError};


/// A warehouse session over a single SQLite database file.
///
/// Views are addressed as `DATABASE.SCHEMA.TABLE`; the database and schema
/// parts must match the session's configured namespace.
pub struct SqliteWarehouse {
    conn: Mutex<Connection>,
    config: WarehouseConfig,
}


impl SqliteWarehouse {
    /// Open the configured database read-only.
    pub fn open(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let conn = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| WarehouseError::Open {
            path: config.path.clone(),
            source,
        })?;

        Ok(Self::from_connection(conn, config.clone()))
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection, config: WarehouseConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            config,
        }
    }
}


impl Warehouse for SqliteWarehouse {
    fn fetch_table(&self, identifier: &str) -> Result<ResultSet, WarehouseError> {
        let name = TableName::resolve(identifier, &self.config.database, &self.config.schema)?;
        let started = Instant::now();

        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
            params![name.table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(WarehouseError::NotFound(name.to_string()));
        }

        // Identifier parts are validated, so quoting cannot be escaped
        let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", name.table))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                let cell = match row.get_ref(i)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Int(v),
                    ValueRef::Real(v) => Value::Float(v),
                    ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
                    ValueRef::Blob(_) => {
                        return Err(WarehouseError::UnsupportedType {
                            table: name.to_string(),
                            column: columns[i].clone(),
                        });
                    }
                };
                cells.push(cell);
            }
            rows.push(cells);
        }

        tracing::debug!(
            table = %name,
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched table"
        );

        Ok(ResultSet::new(columns, rows)?)
    }

    fn describe(&self) -> String {
        format!(
            "{} ({}.{})",
            self.config.label(),
            self.config.database,
            self.config.schema
        )
    }
}
