//! Export functionality for chart images.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{CAPTION, PAGE_TITLE};
use crate::views::{Chart, ChartKind};


// Colour scheme
const BG: &str = "#262624";
const TEXT: &str = "#FAF9F5";
const TEXT_SECONDARY: &str = "#C2C0B7";
const GRID: &str = "#3C3C3A";
const PALETTE: [&str; 6] = ["#CB7B5D", "#6BA8C9", "#8FBF7F", "#D9B44A", "#B07CC6", "#C96B6B"];

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 200.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 110.0;


/// Export a chart as SVG.
pub fn export_chart_svg(chart: &Chart, output_path: &Path) -> Result<()> {
    let svg_content = generate_svg(chart);

    std::fs::write(output_path, svg_content)
        .with_context(|| format!("Failed to write SVG to {}", output_path.display()))?;

    Ok(())
}


/// Export a chart as PNG.
pub fn export_chart_png(chart: &Chart, output_path: &Path) -> Result<()> {
    let svg_content = generate_svg(chart);

    // Parse SVG
    let tree = resvg::usvg::Tree::from_str(
        &svg_content,
        &resvg::usvg::Options::default(),
    ).context("Failed to parse SVG")?;

    // Render to pixmap
    let size = tree.size();
    let width = size.width() as u32;
    let height = size.height() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .context("Failed to create pixmap")?;

    let bg = hex_to_rgb(BG);
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.0, bg.1, bg.2, 255));

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap.save_png(output_path)
        .with_context(|| format!("Failed to save PNG to {}", output_path.display()))?;

    Ok(())
}


/// Plot area mapping from data to pixel coordinates.
struct Frame {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}


impl Frame {
    fn px(&self, x: f64) -> f64 {
        let span = (self.x1 - self.x0).max(f64::EPSILON);
        MARGIN_LEFT + (x - self.x0) / span * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn py(&self, y: f64) -> f64 {
        let span = (self.y1 - self.y0).max(f64::EPSILON);
        HEIGHT - MARGIN_BOTTOM - (y - self.y0) / span * (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM)
    }
}


/// Generate SVG content for a chart.
pub fn generate_svg(chart: &Chart) -> String {
    let mut svg_parts = vec![
        format!(r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg">"#, WIDTH, HEIGHT),
        "<style>".to_string(),
        format!("  .title {{ fill: {}; font: bold 18px sans-serif; }}", TEXT),
        format!("  .axis {{ fill: {}; font: 11px sans-serif; }}", TEXT_SECONDARY),
        format!("  .legend {{ fill: {}; font: 12px sans-serif; }}", TEXT),
        format!("  .caption {{ fill: {}; font: 10px sans-serif; }}", TEXT_SECONDARY),
        "</style>".to_string(),
        format!(r#"<rect width="{}" height="{}" fill="{}"/>"#, WIDTH, HEIGHT, BG),
        format!(
            r#"<text x="{}" y="30" class="caption">{}</text>"#,
            MARGIN_LEFT,
            escape(PAGE_TITLE)
        ),
        format!(
            r#"<text x="{}" y="52" class="title">{}</text>"#,
            MARGIN_LEFT,
            escape(&chart.title)
        ),
    ];

    match chart.bounds() {
        None => svg_parts.push(format!(
            r#"<text x="{}" y="{}" class="axis">No data for this selection</text>"#,
            MARGIN_LEFT,
            HEIGHT / 2.0
        )),
        Some(((x0, x1), (y0, y1))) => {
            let frame = match chart.kind {
                // Bars grow from zero and need half a slot on each side
                ChartKind::Bar => Frame { x0: x0 - 0.5, x1: x1 + 0.5, y0: y0.min(0.0), y1 },
                ChartKind::Line => Frame { x0, x1, y0: y0.min(0.0), y1: y1 * 1.1 },
                ChartKind::ScatterGeo => {
                    let pad_x = ((x1 - x0) * 0.05).max(0.1);
                    let pad_y = ((y1 - y0) * 0.05).max(0.1);
                    Frame { x0: x0 - pad_x, x1: x1 + pad_x, y0: y0 - pad_y, y1: y1 + pad_y }
                }
            };

            draw_axes(&mut svg_parts, chart, &frame);
            match chart.kind {
                ChartKind::Bar => draw_bars(&mut svg_parts, chart, &frame),
                ChartKind::Line => draw_lines(&mut svg_parts, chart, &frame),
                ChartKind::ScatterGeo => draw_points(&mut svg_parts, chart, &frame),
            }
            draw_legend(&mut svg_parts, chart);
        }
    }

    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="caption">{}</text>"#,
        MARGIN_LEFT,
        HEIGHT - 12.0,
        escape(CAPTION)
    ));
    svg_parts.push("</svg>".to_string());

    svg_parts.join("\n")
}


fn draw_axes(parts: &mut Vec<String>, chart: &Chart, frame: &Frame) {
    let bottom = HEIGHT - MARGIN_BOTTOM;
    let right = WIDTH - MARGIN_RIGHT;

    // Horizontal grid lines with y labels
    for i in 0..=4 {
        let y = frame.y0 + (frame.y1 - frame.y0) * i as f64 / 4.0;
        let py = frame.py(y);
        parts.push(format!(
            r#"<line x1="{}" y1="{py:.1}" x2="{}" y2="{py:.1}" stroke="{}" stroke-width="1"/>"#,
            MARGIN_LEFT, right, GRID
        ));
        parts.push(format!(
            r#"<text x="{}" y="{:.1}" class="axis" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 8.0,
            py + 4.0,
            format_tick(y)
        ));
    }

    parts.push(format!(
        r#"<text x="{}" y="{}" class="axis" text-anchor="middle">{}</text>"#,
        (MARGIN_LEFT + right) / 2.0,
        bottom + 60.0,
        escape(&chart.x_label)
    ));
    parts.push(format!(
        r#"<text x="20" y="{}" class="axis" transform="rotate(-90 20 {})" text-anchor="middle">{}</text>"#,
        (MARGIN_TOP + bottom) / 2.0,
        (MARGIN_TOP + bottom) / 2.0,
        escape(&chart.y_label)
    ));

    if chart.kind == ChartKind::ScatterGeo {
        for i in 0..=4 {
            let x = frame.x0 + (frame.x1 - frame.x0) * i as f64 / 4.0;
            parts.push(format!(
                r#"<text x="{:.1}" y="{}" class="axis" text-anchor="middle">{:.2}</text>"#,
                frame.px(x),
                bottom + 18.0,
                x
            ));
        }
    }
}


fn draw_bars(parts: &mut Vec<String>, chart: &Chart, frame: &Frame) {
    let Some(series) = chart.series.first() else {
        return;
    };
    let slot = frame.px(1.0) - frame.px(0.0);
    let bar_width = (slot * 0.7).max(1.0);
    let zero = frame.py(0.0_f64.max(frame.y0));

    for p in &series.points {
        let cx = frame.px(p.x);
        let top = frame.py(p.y);
        parts.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {}</title></rect>"#,
            cx - bar_width / 2.0,
            top.min(zero),
            bar_width,
            (zero - top).abs(),
            PALETTE[0],
            escape(&p.label),
            format_tick(p.y)
        ));
        parts.push(format!(
            r#"<text x="{:.1}" y="{:.1}" class="axis" text-anchor="end" transform="rotate(-35 {:.1} {:.1})">{}</text>"#,
            cx,
            HEIGHT - MARGIN_BOTTOM + 16.0,
            cx,
            HEIGHT - MARGIN_BOTTOM + 16.0,
            escape(&truncate_label(&p.label, 22))
        ));
    }
}


fn draw_lines(parts: &mut Vec<String>, chart: &Chart, frame: &Frame) {
    for (i, series) in chart.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let path: Vec<String> = series
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", frame.px(p.x), frame.py(p.y)))
            .collect();
        parts.push(format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            path.join(" "),
            color
        ));
        for p in &series.points {
            parts.push(format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"><title>{} {}: {}</title></circle>"#,
                frame.px(p.x),
                frame.py(p.y),
                color,
                escape(&series.name),
                escape(&p.label),
                format_tick(p.y)
            ));
        }
    }

    // x labels from the first series
    if let Some(series) = chart.series.first() {
        for p in &series.points {
            parts.push(format!(
                r#"<text x="{:.1}" y="{}" class="axis" text-anchor="middle">{}</text>"#,
                frame.px(p.x),
                HEIGHT - MARGIN_BOTTOM + 18.0,
                escape(&p.label)
            ));
        }
    }
}


fn draw_points(parts: &mut Vec<String>, chart: &Chart, frame: &Frame) {
    for (i, series) in chart.series.iter().enumerate() {
        let color = series_color(&series.name, i);
        for p in &series.points {
            parts.push(format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="7" fill="{}" fill-opacity="0.85"><title>{}</title></circle>"#,
                frame.px(p.x),
                frame.py(p.y),
                color,
                escape(&p.label)
            ));
        }
    }
}


fn draw_legend(parts: &mut Vec<String>, chart: &Chart) {
    let x = WIDTH - MARGIN_RIGHT + 20.0;
    for (i, series) in chart.series.iter().enumerate() {
        let y = MARGIN_TOP + 10.0 + i as f64 * 22.0;
        parts.push(format!(
            r#"<rect x="{}" y="{}" width="12" height="12" fill="{}"/>"#,
            x,
            y - 10.0,
            series_color(&series.name, i)
        ));
        parts.push(format!(
            r#"<text x="{}" y="{}" class="legend">{}</text>"#,
            x + 18.0,
            y,
            escape(&truncate_label(&series.name, 24))
        ));
    }
}


/// Rating categories keep a fixed colour; anything else cycles the palette.
fn series_color(name: &str, index: usize) -> &'static str {
    match name {
        "Better" => PALETTE[2],
        "As Expected" => PALETTE[1],
        "Worse" => PALETTE[5],
        _ => PALETTE[index % PALETTE.len()],
    }
}


fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}


fn truncate_label(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width - 1).collect();
        format!("{cut}…")
    }
}


/// Escape text for SVG content.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}


/// Convert hex color to RGB tuple.
fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    (r, g, b)
}


/// Open file with default application.
pub fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .context("Failed to open file")?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.to_string_lossy()])
            .spawn()
            .context("Failed to open file")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .context("Failed to open file")?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{Point, Series};
    use tempfile::TempDir;

    fn chart(kind: ChartKind, points: Vec<(&str, f64, f64)>) -> Chart {
        Chart {
            kind,
            title: "Cases & deaths <2021>".to_string(),
            x_label: "RPT_YEAR".to_string(),
            y_label: "CASE_COUNT".to_string(),
            series: vec![Series {
                name: "As Expected".to_string(),
                points: points
                    .into_iter()
                    .map(|(label, x, y)| Point { label: label.to_string(), x, y })
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_svg_escapes_title() {
        let svg = generate_svg(&chart(ChartKind::Bar, vec![("2020", 0.0, 10.0)]));
        assert!(svg.contains("Cases &amp; deaths &lt;2021&gt;"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_svg_marks_per_kind() {
        let points = vec![("2019", 0.0, 5.0), ("2020", 1.0, 7.5), ("2021", 2.0, 6.0)];

        let bars = generate_svg(&chart(ChartKind::Bar, points.clone()));
        assert_eq!(bars.matches("<rect").count(), 1 + 3 + 1); // background, bars, legend

        let line = generate_svg(&chart(ChartKind::Line, points.clone()));
        assert!(line.contains("<polyline"));
        assert_eq!(line.matches("<circle").count(), 3);

        let geo = generate_svg(&chart(
            ChartKind::ScatterGeo,
            vec![("UCSF", -122.45, 37.76), ("Scripps", -117.22, 32.88)],
        ));
        assert_eq!(geo.matches("<circle").count(), 2);
    }

    #[test]
    fn test_empty_chart_has_placeholder() {
        let svg = generate_svg(&chart(ChartKind::Line, vec![]));
        assert!(svg.contains("No data for this selection"));
    }

    #[test]
    fn test_export_svg_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("chart.svg");
        export_chart_svg(&chart(ChartKind::Bar, vec![("2020", 0.0, 3.0)]), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<svg"));
    }

    #[test]
    fn test_export_png_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("chart.png");
        let points = vec![("2019", 0.0, 5.0), ("2020", 1.0, 7.5)];
        export_chart_png(&chart(ChartKind::Line, points), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#262624"), (0x26, 0x26, 0x24));
    }
}
