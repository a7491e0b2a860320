//! Dashboard rendering using terminal output.

use std::fmt::Write;

use crate::config::{CAPTION, PAGE_ICON, PAGE_TITLE};
use crate::models::{ResultSet, Value};
use crate::views::{Chart, ChartKind, TablePanel, Tab, ViewModel};


// Constants
const ORANGE: &str = "\x1b[38;5;208m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const BAR_WIDTH: usize = 30;
const LABEL_WIDTH: usize = 36;
const MAX_CELL_WIDTH: usize = 36;
const MAX_TABLE_ROWS: usize = 25;
const MAP_WIDTH: usize = 56;
const MAP_HEIGHT: usize = 18;


/// Format a number with thousands separators (ints) or two decimals.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Int(i) => format_thousands(*i),
        Value::Float(f) => format!("{:.2}", f),
        other => other.to_string(),
    }
}


fn format_thousands(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    if n < 0 {
        format!("-{result}")
    } else {
        result
    }
}


fn format_axis(v: f64) -> String {
    if v.fract() == 0.0 {
        format_thousands(v as i64)
    } else {
        format!("{:.2}", v)
    }
}


/// Create a simple text bar for visualization.
fn create_bar(value: f64, max_value: f64, width: usize, color: &str) -> String {
    if max_value <= 0.0 {
        return format!("{DIM}{}{RESET}", "░".repeat(width));
    }

    let filled = ((value / max_value) * width as f64).max(0.0) as usize;
    let filled = filled.min(width);

    format!(
        "{}{}{}{}{}",
        color,
        "█".repeat(filled),
        RESET,
        DIM,
        "░".repeat(width - filled),
    ) + RESET
}


fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}


/// Colour for a rating category, if the text is one.
fn rating_color(text: &str) -> Option<&'static str> {
    match text {
        "Better" => Some(GREEN),
        "Worse" => Some(RED),
        "As Expected" => Some(CYAN),
        _ => None,
    }
}


/// Render a view to the terminal.
pub fn render_dashboard(view: &ViewModel, clear_screen: bool) {
    if clear_screen {
        print!("\x1b[2J\x1b[H"); // Clear screen and move cursor to top
    }
    print!("{}", format_dashboard(view));
}


/// Render a view into a string.
pub fn format_dashboard(view: &ViewModel) -> String {
    let mut out = String::new();

    render_header(&mut out, view.tab);
    render_selectors(&mut out, view);

    for chart in &view.charts {
        render_chart(&mut out, chart);
        out.push('\n');
    }

    for table in &view.tables {
        render_table_panel(&mut out, table);
        out.push('\n');
    }

    let _ = writeln!(out, "{DIM}{CAPTION}{RESET}");
    out
}


/// Page title plus tab strip.
fn render_header(out: &mut String, active: Tab) {
    let _ = writeln!(out, "{BOLD}{PAGE_ICON} {PAGE_TITLE}{RESET}");

    let tabs: Vec<String> = Tab::ALL
        .iter()
        .map(|t| {
            if *t == active {
                format!("{BOLD}{ORANGE}[ {} ]{RESET}", t.title())
            } else {
                format!("{DIM}  {}  {RESET}", t.title())
            }
        })
        .collect();
    let _ = writeln!(out, "{}\n", tabs.join(" "));
}


fn render_selectors(out: &mut String, view: &ViewModel) {
    if view.selectors.is_empty() {
        return;
    }
    let parts: Vec<String> = view
        .selectors
        .iter()
        .map(|s| {
            format!(
                "{}: {CYAN}{}{RESET} {DIM}({} options){RESET}",
                s.label,
                s.display(),
                s.options.len()
            )
        })
        .collect();
    let _ = writeln!(out, "{}\n", parts.join("   "));
}


fn render_chart(out: &mut String, chart: &Chart) {
    let _ = writeln!(out, "{BOLD}{}{RESET}", chart.title);

    if chart.is_empty() {
        let _ = writeln!(out, "{DIM}No data for this selection{RESET}");
        return;
    }

    match chart.kind {
        ChartKind::Bar => render_bars(out, chart),
        ChartKind::Line => render_lines(out, chart),
        ChartKind::ScatterGeo => render_map(out, chart),
    }
}


/// Horizontal bars, one per point.
fn render_bars(out: &mut String, chart: &Chart) {
    let max = chart
        .series
        .iter()
        .flat_map(|s| &s.points)
        .map(|p| p.y)
        .fold(0.0_f64, f64::max);

    for series in &chart.series {
        for point in &series.points {
            let _ = writeln!(
                out,
                "  {:<width$} {} {ORANGE}{:>10}{RESET}",
                truncate(&point.label, LABEL_WIDTH),
                create_bar(point.y, max, BAR_WIDTH, ORANGE),
                format_axis(point.y),
                width = LABEL_WIDTH,
            );
        }
    }
}


/// One row per series: the name, then each (x, y) as a mini bar.
fn render_lines(out: &mut String, chart: &Chart) {
    const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let Some((_, (y0, y1))) = chart.bounds() else {
        return;
    };
    let span = (y1 - y0).max(f64::EPSILON);

    let _ = writeln!(
        out,
        "  {DIM}{} by {}, min {}{RESET}",
        chart.y_label,
        chart.x_label,
        format_axis(y0),
    );

    for series in &chart.series {
        let spark: String = series
            .points
            .iter()
            .map(|p| {
                let level = (((p.y - y0) / span) * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            })
            .collect();
        let values: Vec<String> = series.points.iter().map(|p| format_axis(p.y)).collect();
        let _ = writeln!(
            out,
            "  {:<width$} {ORANGE}{}{RESET} {DIM}{}{RESET}",
            truncate(&series.name, LABEL_WIDTH),
            spark,
            values.join(" "),
            width = LABEL_WIDTH,
        );
    }
    let _ = writeln!(out, "  {DIM}max {}{RESET}", format_axis(y1));
}


/// Character grid with x = longitude, y = latitude.
fn render_map(out: &mut String, chart: &Chart) {
    let Some(((x0, x1), (y0, y1))) = chart.bounds() else {
        return;
    };
    let xspan = (x1 - x0).max(f64::EPSILON);
    let yspan = (y1 - y0).max(f64::EPSILON);

    let mut grid = vec![vec![String::from(" "); MAP_WIDTH]; MAP_HEIGHT];
    for series in &chart.series {
        let color = rating_color(&series.name).unwrap_or(ORANGE);
        for p in &series.points {
            let col = (((p.x - x0) / xspan) * (MAP_WIDTH - 1) as f64).round() as usize;
            let row = (((y1 - p.y) / yspan) * (MAP_HEIGHT - 1) as f64).round() as usize;
            grid[row.min(MAP_HEIGHT - 1)][col.min(MAP_WIDTH - 1)] = format!("{color}●{RESET}");
        }
    }

    let border = "─".repeat(MAP_WIDTH);
    let _ = writeln!(out, "  ┌{border}┐ {DIM}{:.2}°N{RESET}", y1);
    for row in grid {
        let _ = writeln!(out, "  │{}│", row.concat());
    }
    let _ = writeln!(out, "  └{border}┘ {DIM}{:.2}°N{RESET}", y0);
    let _ = writeln!(out, "  {DIM}{:.2}°{:>w$.2}°{RESET}", x0, x1, w = MAP_WIDTH);

    let legend: Vec<String> = chart
        .series
        .iter()
        .map(|s| {
            let color = rating_color(&s.name).unwrap_or(ORANGE);
            format!("{color}●{RESET} {} ({})", s.name, s.points.len())
        })
        .collect();
    let _ = writeln!(out, "  {}", legend.join("   "));
}


fn render_table_panel(out: &mut String, panel: &TablePanel) {
    if panel.collapsed {
        let _ = writeln!(
            out,
            "{BOLD}▸ {}{RESET} {DIM}({} rows, use --raw to expand){RESET}",
            panel.caption,
            panel.data.len()
        );
        return;
    }

    let _ = writeln!(out, "{BOLD}▾ {}{RESET}", panel.caption);
    render_table(out, &panel.data);
}


/// Boxed table with right-aligned numbers.
pub fn render_table(out: &mut String, data: &ResultSet) {
    if data.is_empty() {
        let _ = writeln!(out, "{DIM}No rows{RESET}");
        return;
    }

    let shown = data.head(MAX_TABLE_ROWS);
    let cells: Vec<Vec<String>> = shown
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| truncate(&format_value(v), MAX_CELL_WIDTH)).collect())
        .collect();

    let widths: Vec<usize> = data
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let rule = |l: &str, m: &str, r: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{l}{}{r}", segments.join(m))
    };

    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let header: Vec<String> = data
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {BOLD}{:<w$}{RESET} ", truncate(c, *w), w = *w))
        .collect();
    let _ = writeln!(out, "│{}│", header.join("│"));
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (row, texts) in shown.rows().iter().zip(&cells) {
        let line: Vec<String> = row
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((value, text), w)| match value {
                Value::Int(_) | Value::Float(_) => format!(" {:>w$} ", text, w = *w),
                Value::Text(s) => match rating_color(s) {
                    Some(color) => format!(" {color}{:<w$}{RESET} ", text, w = *w),
                    None => format!(" {:<w$} ", text, w = *w),
                },
                Value::Null => format!(" {:<w$} ", "", w = *w),
            })
            .collect();
        let _ = writeln!(out, "│{}│", line.join("│"));
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));

    if data.len() > MAX_TABLE_ROWS {
        let _ = writeln!(out, "{DIM}… {} more rows{RESET}", data.len() - MAX_TABLE_ROWS);
    }
}
