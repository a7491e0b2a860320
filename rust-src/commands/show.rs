//! Show command - render one tab to the terminal.

use std::path::Path;

use anyhow::{Context, Result};

use crate::views::{render_view, Selection, Tab};
use crate::visualization::render_dashboard;


/// Run the show command.
pub fn run(secrets: Option<&Path>, tab: Tab, selection: Selection, json: bool) -> Result<()> {
    let loader = super::open_loader(secrets)?;
    let view = render_view(tab, &loader, &selection)
        .with_context(|| format!("Failed to render the {} tab", tab.title()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        render_dashboard(&view, false);
    }

    Ok(())
}
