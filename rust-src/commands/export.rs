//! Export command for chart images.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::views::{render_view, Selection, Tab};
use crate::visualization::{export_chart_png, export_chart_svg, open_file};


/// Run the export command.
pub fn run(
    secrets: Option<&Path>,
    tab: Tab,
    selection: Selection,
    svg: bool,
    should_open: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    // Determine format and output path
    let format_type = if svg { "svg" } else { "png" };
    let output_path = output.unwrap_or_else(|| default_output(tab, format_type));

    let loader = super::open_loader(secrets)?;
    let view = render_view(tab, &loader, &selection)
        .with_context(|| format!("Failed to render the {} tab", tab.title()))?;

    let chart = view
        .charts
        .first()
        .with_context(|| format!("The {} tab has no chart to export", tab.title()))?;

    println!("Exporting \"{}\" to {}...", chart.title, format_type.to_uppercase());

    if svg {
        export_chart_svg(chart, &output_path)?;
    } else {
        export_chart_png(chart, &output_path)?;
    }

    println!("\x1b[32m+ Exported to: {}\x1b[0m", output_path.display());

    // Open if requested
    if should_open {
        println!("Opening {}...", format_type.to_uppercase());
        open_file(&output_path)?;
    }

    Ok(())
}


fn default_output(tab: Tab, extension: &str) -> PathBuf {
    let name = format!("{:?}", tab).to_lowercase();
    PathBuf::from(format!("hpm-{name}.{extension}"))
}
