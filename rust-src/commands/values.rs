//! Values command - list selector options for a column.

use std::path::Path;

use anyhow::Result;

use crate::config::resolve_view_name;


/// Run the values command.
pub fn run(secrets: Option<&Path>, view: &str, column: &str) -> Result<()> {
    let loader = super::open_loader(secrets)?;
    let identifier = resolve_view_name(view);

    let data = loader.load(&identifier)?;
    for value in data.unique(column)? {
        println!("{value}");
    }

    Ok(())
}
