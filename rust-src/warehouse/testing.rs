//! Test doubles for warehouse sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::WarehouseConfig;
use crate::models::ResultSet;

use super::{seed_connection, SqliteWarehouse, TableLoader, Warehouse, WarehouseError};


/// In-memory warehouse that counts fetches.
#[derive(Default)]
pub struct MemoryWarehouse {
    tables: Mutex<HashMap<String, ResultSet>>,
    fetches: AtomicUsize,
}


impl MemoryWarehouse {
    pub fn with_table(identifier: &str, data: ResultSet) -> Self {
        let warehouse = Self::default();
        warehouse.insert(identifier, data);
        warehouse
    }

    pub fn insert(&self, identifier: &str, data: ResultSet) {
        self.tables
            .lock()
            .unwrap()
            .insert(identifier.to_string(), data);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}


impl Warehouse for MemoryWarehouse {
    fn fetch_table(&self, identifier: &str) -> Result<ResultSet, WarehouseError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.tables
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .ok_or_else(|| WarehouseError::NotFound(identifier.to_string()))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}


/// Loader over a freshly seeded in-memory demo warehouse.
pub fn demo_loader() -> TableLoader {
    let mut conn = Connection::open_in_memory().unwrap();
    seed_connection(&mut conn).unwrap();
    let warehouse = SqliteWarehouse::from_connection(conn, WarehouseConfig::local(":memory:"));
    TableLoader::new(Arc::new(warehouse))
}
