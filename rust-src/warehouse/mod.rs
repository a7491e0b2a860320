//! Warehouse access: sessions, table reads and the per-table cache.

mod identifier;
mod loader;
mod seed;
mod session;
mod sqlite;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{FrameError, ResultSet};

pub use identifier::TableName;
pub use loader::TableLoader;
#[allow(unused_imports)]
pub use seed::{seed_connection, seed_demo_warehouse, SeedSummary};
pub use session::SessionProvider;
pub use sqlite::SqliteWarehouse;


/// Errors surfaced by warehouse sessions and reads.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("'{identifier}' is outside the session namespace {expected}")]
    UnknownNamespace { identifier: String, expected: String },

    #[error("table or view '{0}' does not exist")]
    NotFound(String),

    #[error("failed to open warehouse at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("column '{column}' of '{table}' holds binary data")]
    UnsupportedType { table: String, column: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),
}


/// A source of named tables and views.
pub trait Warehouse: Send + Sync {
    /// Read the full contents of a table or view.
    fn fetch_table(&self, identifier: &str) -> Result<ResultSet, WarehouseError>;

    /// Short description for banners and logs.
    fn describe(&self) -> String;
}
