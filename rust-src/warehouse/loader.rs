//! Memoized full-table reads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::models::ResultSet;

use super::{Warehouse, WarehouseError};


#[derive(Debug, Clone)]
struct CachedTable {
    data: Arc<ResultSet>,
    fetched_at: DateTime<Local>,
}


/// Loads whole tables from the warehouse, caching each by identifier.
///
/// The cache key is the identifier string exactly as given. Entries live
/// until [`TableLoader::invalidate`] or [`TableLoader::clear`].
pub struct TableLoader {
    warehouse: Arc<dyn Warehouse>,
    cache: Mutex<HashMap<String, CachedTable>>,
}


impl TableLoader {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            warehouse,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Full contents of `identifier`, fetched at most once.
    ///
    /// Fetch errors are returned as-is and leave the cache untouched.
    pub fn load(&self, identifier: &str) -> Result<Arc<ResultSet>, WarehouseError> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = cache.get(identifier) {
            tracing::debug!(table = identifier, "cache hit");
            return Ok(entry.data.clone());
        }

        let data = Arc::new(self.warehouse.fetch_table(identifier)?);
        cache.insert(
            identifier.to_string(),
            CachedTable {
                data: data.clone(),
                fetched_at: Local::now(),
            },
        );

        Ok(data)
    }

    /// Drop one cached table. Returns whether it was cached.
    #[allow(dead_code)]
    pub fn invalidate(&self, identifier: &str) -> bool {
        let removed = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(identifier)
            .is_some();
        if removed {
            tracing::debug!(table = identifier, "invalidated cached table");
        }
        removed
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::debug!(tables = cache.len(), "cleared table cache");
        cache.clear();
    }

    /// When `identifier` was last fetched, if cached.
    pub fn fetched_at(&self, identifier: &str) -> Option<DateTime<Local>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(identifier)
            .map(|entry| entry.fetched_at)
    }

    /// Cached identifiers, sorted.
    pub fn cached(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn warehouse(&self) -> &Arc<dyn Warehouse> {
        &self.warehouse
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::warehouse::testing::MemoryWarehouse;

    fn loader() -> (Arc<MemoryWarehouse>, TableLoader) {
        let warehouse = Arc::new(MemoryWarehouse::with_table(
            "HOSPITAL_DB.PUBLIC.STATE_CASE_TREND",
            ResultSet::new(
                vec!["RPT_YEAR".into(), "CASE_COUNT".into()],
                vec![vec![Value::Int(2020), Value::Int(10)]],
            )
            .unwrap(),
        ));
        let loader = TableLoader::new(warehouse.clone());
        (warehouse, loader)
    }

    #[test]
    fn test_second_load_is_cached() {
        let (warehouse, loader) = loader();

        let first = loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();
        let second = loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();

        assert_eq!(first, second);
        assert_eq!(warehouse.fetch_count(), 1);
        assert!(loader.fetched_at("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").is_some());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let (warehouse, loader) = loader();

        assert!(loader.load("HOSPITAL_DB.PUBLIC.MISSING").is_err());
        assert!(loader.load("HOSPITAL_DB.PUBLIC.MISSING").is_err());

        assert_eq!(warehouse.fetch_count(), 2);
        assert!(loader.cached().is_empty());
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let (warehouse, loader) = loader();

        loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();
        assert!(loader.invalidate("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND"));
        assert!(!loader.invalidate("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND"));
        loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();

        assert_eq!(warehouse.fetch_count(), 2);
    }

    #[test]
    fn test_clear_drops_everything() {
        let (warehouse, loader) = loader();

        loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();
        assert_eq!(loader.cached(), vec!["HOSPITAL_DB.PUBLIC.STATE_CASE_TREND"]);
        loader.clear();
        assert!(loader.cached().is_empty());
        loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();

        assert_eq!(warehouse.fetch_count(), 2);
    }

    #[test]
    fn test_key_is_identifier_verbatim() {
        let (warehouse, loader) = loader();
        warehouse.insert(
            "STATE_CASE_TREND",
            ResultSet::new(vec!["RPT_YEAR".into()], vec![]).unwrap(),
        );

        loader.load("HOSPITAL_DB.PUBLIC.STATE_CASE_TREND").unwrap();
        loader.load("STATE_CASE_TREND").unwrap();

        assert_eq!(warehouse.fetch_count(), 2);
        assert_eq!(loader.cached().len(), 2);
    }
}
