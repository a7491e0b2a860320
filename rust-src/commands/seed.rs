//! Seed command - write the demo warehouse.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{get_warehouse_path, load_secrets, SecretsError};
use crate::warehouse::seed_demo_warehouse;


/// Run the seed command.
pub fn run(secrets: Option<&Path>, path: Option<PathBuf>, force: bool) -> Result<()> {
    let db_path = match path {
        Some(p) => p,
        None => configured_path(secrets)?,
    };

    println!("Seeding demo warehouse at {}...", db_path.display());
    let summary = seed_demo_warehouse(&db_path, force)?;

    println!(
        "\x1b[32m+ Wrote {} hospitals and {} outcome rows\x1b[0m",
        summary.hospitals, summary.outcomes
    );
    println!("\nAdd this to secrets.toml:\n\n[warehouse]\npath = \"{}\"", db_path.display());
    Ok(())
}


/// Warehouse path from the secrets file, or the default data path when
/// no secrets file exists yet. An explicitly named secrets file must exist.
fn configured_path(secrets: Option<&Path>) -> Result<PathBuf> {
    match load_secrets(secrets) {
        Ok(s) => Ok(s.warehouse.path),
        Err(SecretsError::NotFound { .. }) if secrets.is_none() => Ok(get_warehouse_path()),
        Err(e) => Err(e.into()),
    }
}
