//! CLI command implementations.

pub mod check;
pub mod dashboard;
pub mod export;
pub mod seed;
pub mod show;
pub mod values;

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::load_secrets;
use crate::warehouse::{SessionProvider, TableLoader};


/// Load the secrets, open the warehouse session and wrap it in a loader.
pub(crate) fn open_loader(secrets: Option<&Path>) -> Result<TableLoader> {
    let secrets = load_secrets(secrets)
        .context("No warehouse configured. Run 'hpm seed' and point --secrets at a secrets.toml")?;
    let provider = SessionProvider::new(secrets.warehouse);
    let session = provider
        .session()
        .with_context(|| format!("Failed to connect to {}", provider.config().label()))?;
    Ok(TableLoader::new(session))
}
