//! Presentation backends for dashboard views.

mod dashboard;
mod export;
mod tui;

pub use dashboard::render_dashboard;
pub use export::{export_chart_png, export_chart_svg, open_file};
pub use tui::run_dashboard;
