//! Process-lifetime warehouse session.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::WarehouseConfig;

use super::{SqliteWarehouse, Warehouse, WarehouseError};


type Connector =
    Box<dyn Fn(&WarehouseConfig) -> Result<Arc<dyn Warehouse>, WarehouseError> + Send + Sync>;


/// Builds the warehouse session once and hands out shared handles.
///
/// A failed connection attempt is not remembered; the next call retries.
pub struct SessionProvider {
    config: WarehouseConfig,
    session: OnceCell<Arc<dyn Warehouse>>,
    connect: Connector,
}


impl SessionProvider {
    /// Provider connecting to the SQLite warehouse named by `config`.
    pub fn new(config: WarehouseConfig) -> Self {
        Self::with_connector(config, |config| {
            let warehouse = SqliteWarehouse::open(config)?;
            Ok(Arc::new(warehouse) as Arc<dyn Warehouse>)
        })
    }

    /// Provider using a custom connection function.
    pub fn with_connector<F>(config: WarehouseConfig, connect: F) -> Self
    where
        F: Fn(&WarehouseConfig) -> Result<Arc<dyn Warehouse>, WarehouseError> + Send + Sync + 'static,
    {
        Self {
            config,
            session: OnceCell::new(),
            connect: Box::new(connect),
        }
    }

    /// The shared session, connecting on first use.
    pub fn session(&self) -> Result<Arc<dyn Warehouse>, WarehouseError> {
        self.session
            .get_or_try_init(|| {
                let session = (self.connect)(&self.config)?;
                tracing::info!(session = %session.describe(), "Connected to warehouse");
                Ok(session)
            })
            .cloned()
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }
}
