//! Check command - verify the warehouse connection and source views.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use crate::config::SOURCE_VIEWS;


/// Run the check command.
pub fn run(secrets: Option<&Path>) -> Result<()> {
    let started = Instant::now();
    let loader = super::open_loader(secrets)?;

    println!("\x1b[32m+ Connected to {}\x1b[0m", loader.warehouse().describe());

    for view in SOURCE_VIEWS {
        let data = loader.load(view)?;
        println!(
            "  {:<40} {:>6} rows  {:>2} columns",
            view,
            data.len(),
            data.columns().len()
        );
    }

    println!("\nAll {} views readable ({:.2?}).", SOURCE_VIEWS.len(), started.elapsed());
    Ok(())
}
