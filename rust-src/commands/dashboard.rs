//! Dashboard command - interactive terminal UI.

use std::path::Path;

use anyhow::Result;

use crate::views::{Selection, Tab};
use crate::visualization::run_dashboard;


/// Run the dashboard command.
pub fn run(secrets: Option<&Path>, tab: Tab, selection: Selection) -> Result<()> {
    let loader = super::open_loader(secrets)?;
    run_dashboard(&loader, tab, selection)
}
