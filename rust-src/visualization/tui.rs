//! Interactive dashboard built on ratatui.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart as ChartWidget, Dataset, GraphType,
    Paragraph, Row, Table, Tabs,
};
use ratatui::{Frame, Terminal};

use crate::config::{CAPTION, PAGE_ICON, PAGE_TITLE};
use crate::models::ResultSet;
use crate::views::{render_view, Chart, ChartKind, Fallback, Selection, Tab, TablePanel, ViewModel};
use crate::warehouse::TableLoader;

use super::dashboard::format_value;


const PALETTE: [Color; 6] = [
    Color::Rgb(203, 123, 93),
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Red,
];
const POLL_INTERVAL: Duration = Duration::from_millis(250);


/// What the main loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    /// Rebuild the current view from cached tables.
    Refresh,
    /// Drop every cached table, then rebuild.
    Reload,
}


/// Dashboard state: the active tab, the user's selection and the rendered view.
pub struct DashboardState {
    pub tab: Tab,
    pub selection: Selection,
    /// Index of the selector that ↑/↓ act on.
    pub focus: usize,
    pub view: Option<ViewModel>,
    pub error: Option<String>,
    /// Cache summary for the footer.
    pub cache_note: String,
}


impl DashboardState {
    pub fn new(tab: Tab, selection: Selection) -> Self {
        Self {
            tab,
            selection,
            focus: 0,
            view: None,
            error: None,
            cache_note: String::new(),
        }
    }

    /// Re-run the renderer for the active tab.
    pub fn refresh(&mut self, loader: &TableLoader) {
        match render_view(self.tab, loader, &self.selection) {
            Ok(view) => {
                if self.focus >= view.selectors.len() {
                    self.focus = 0;
                }
                self.view = Some(view);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Rendering {} failed: {e:#}", self.tab.title());
                self.view = None;
                self.error = Some(format!("{e:#}"));
            }
        }

        let cached = loader.cached();
        let oldest = cached.iter().filter_map(|id| loader.fetched_at(id)).min();
        self.cache_note = match oldest {
            Some(at) => format!("{} views cached since {}", cached.len(), at.format("%H:%M:%S")),
            None => "nothing cached".to_string(),
        };
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.focus = 0;
    }

    /// Step the focused selector by `delta` through its options.
    ///
    /// Selectors that fall back to "All" include that state in the cycle.
    fn cycle_selector(&mut self, delta: isize) -> bool {
        let Some(selector) = self.view.as_ref().and_then(|v| v.selectors.get(self.focus)) else {
            return false;
        };
        if selector.options.is_empty() {
            return false;
        }

        let with_all = selector.fallback == Fallback::All;
        let slots = selector.options.len() + usize::from(with_all);
        let current = match selector.selected_index() {
            Some(i) => i + usize::from(with_all),
            None if with_all && selector.value.is_none() => 0,
            None => slots - 1,
        };
        let next = (current as isize + delta).rem_euclid(slots as isize) as usize;

        let value = if with_all {
            next.checked_sub(1).map(|i| selector.options[i].to_string())
        } else {
            Some(selector.options[next].to_string())
        };
        let column = selector.column;
        self.selection.set(column, value);
        true
    }
}


/// Map a key press onto the state.
pub fn handle_key(state: &mut DashboardState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,

        KeyCode::Tab | KeyCode::Right => {
            state.switch_tab(state.tab.next());
            KeyAction::Refresh
        }
        KeyCode::BackTab | KeyCode::Left => {
            state.switch_tab(state.tab.prev());
            KeyAction::Refresh
        }
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            state.switch_tab(Tab::ALL[index]);
            KeyAction::Refresh
        }

        KeyCode::Down => {
            if state.cycle_selector(1) {
                KeyAction::Refresh
            } else {
                KeyAction::None
            }
        }
        KeyCode::Up => {
            if state.cycle_selector(-1) {
                KeyAction::Refresh
            } else {
                KeyAction::None
            }
        }
        KeyCode::Char('s') => {
            let count = state.view.as_ref().map_or(0, |v| v.selectors.len());
            if count > 0 {
                state.focus = (state.focus + 1) % count;
            }
            KeyAction::None
        }
        KeyCode::Char('t') => {
            state.selection.raw = !state.selection.raw;
            KeyAction::Refresh
        }
        KeyCode::Char('r') => KeyAction::Reload,
        _ => KeyAction::None,
    }
}


/// Run the interactive dashboard until the user quits.
pub fn run_dashboard(loader: &TableLoader, tab: Tab, selection: Selection) -> Result<()> {
    let mut state = DashboardState::new(tab, selection);
    state.refresh(loader);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, loader, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}


fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    loader: &TableLoader,
    state: &mut DashboardState,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(state, key) {
            KeyAction::Quit => return Ok(()),
            KeyAction::Refresh => state.refresh(loader),
            KeyAction::Reload => {
                loader.clear();
                state.refresh(loader);
            }
            KeyAction::None => {}
        }
    }
}


fn draw(frame: &mut Frame, state: &DashboardState) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Tabs
        Constraint::Length(1), // Selectors
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Footer
    ])
    .split(frame.area());

    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {PAGE_ICON} {PAGE_TITLE} ")),
        )
        .highlight_style(Style::default().fg(PALETTE[0]).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    draw_selectors(frame, chunks[1], state);

    match (&state.view, &state.error) {
        (_, Some(error)) => {
            let msg = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title(" Error "));
            frame.render_widget(msg, chunks[2]);
        }
        (Some(view), None) => draw_content(frame, chunks[2], view),
        (None, None) => {}
    }

    let footer = Line::from(vec![
        Span::styled(
            " Tab/←→ tabs  ↑↓ change  s next selector  t raw tables  r reload  q quit ",
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::styled(
            format!("  {} | {CAPTION}", state.cache_note),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer), chunks[3]);
}


fn draw_selectors(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let Some(view) = &state.view else {
        return;
    };
    let mut spans = Vec::new();
    for (i, sel) in view.selectors.iter().enumerate() {
        let style = if i == state.focus {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::raw(format!(" {}: ", sel.label)));
        spans.push(Span::styled(format!(" {} ", sel.display()), style));
    }
    if state.selection.raw {
        spans.push(Span::styled("  [raw]", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}


fn draw_content(frame: &mut Frame, area: Rect, view: &ViewModel) {
    let expanded: Vec<&TablePanel> = view.tables.iter().filter(|t| !t.collapsed).collect();
    let collapsed = view.tables.len() - expanded.len();

    let mut constraints = vec![Constraint::Percentage(50); view.charts.len()];
    constraints.extend(expanded.iter().map(|_| Constraint::Min(5)));
    if collapsed > 0 {
        constraints.push(Constraint::Length(collapsed as u16));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut slot = chunks.iter();
    for chart in &view.charts {
        if let Some(area) = slot.next() {
            draw_chart(frame, *area, chart);
        }
    }
    for panel in &expanded {
        if let Some(area) = slot.next() {
            draw_table(frame, *area, &panel.caption, &panel.data);
        }
    }
    if let Some(area) = slot.next() {
        let lines: Vec<Line> = view
            .tables
            .iter()
            .filter(|t| t.collapsed)
            .map(|t| {
                Line::styled(
                    format!(" ▸ {} ({} rows, press t to expand)", t.caption, t.data.len()),
                    Style::default().fg(Color::DarkGray),
                )
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), *area);
    }
}


fn draw_chart(frame: &mut Frame, area: Rect, chart: &Chart) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", chart.title));

    let Some(((x0, x1), (y0, y1))) = chart.bounds() else {
        frame.render_widget(Paragraph::new(" No data for this selection").block(block), area);
        return;
    };

    match chart.kind {
        ChartKind::Bar => {
            let Some(series) = chart.series.first() else {
                return;
            };
            // BarChart takes integers, so keep two decimals of precision
            let bars: Vec<Bar> = series
                .points
                .iter()
                .map(|p| {
                    Bar::default()
                        .value((p.y.max(0.0) * 100.0).round() as u64)
                        .text_value(format_value(&p.y.into()))
                        .label(Line::from(p.label.clone()))
                        .style(Style::default().fg(PALETTE[0]))
                })
                .collect();
            let widget = BarChart::default()
                .block(block)
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(0)
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(widget, area);
        }
        ChartKind::Line | ChartKind::ScatterGeo => {
            let data: Vec<Vec<(f64, f64)>> = chart
                .series
                .iter()
                .map(|s| s.points.iter().map(|p| (p.x, p.y)).collect())
                .collect();
            let (graph, marker) = if chart.kind == ChartKind::Line {
                (GraphType::Line, symbols::Marker::Braille)
            } else {
                (GraphType::Scatter, symbols::Marker::Dot)
            };
            let datasets: Vec<Dataset> = chart
                .series
                .iter()
                .zip(&data)
                .enumerate()
                .map(|(i, (s, points))| {
                    Dataset::default()
                        .name(s.name.clone())
                        .marker(marker)
                        .graph_type(graph)
                        .style(Style::default().fg(series_color(&s.name, i)))
                        .data(points)
                })
                .collect();

            let (x0, x1) = padded(x0, x1);
            let (y0, y1) = if chart.kind == ChartKind::Line {
                (y0.min(0.0), y1 * 1.1)
            } else {
                padded(y0, y1)
            };
            let widget = ChartWidget::new(datasets)
                .block(block)
                .x_axis(
                    Axis::default()
                        .title(chart.x_label.clone())
                        .bounds([x0, x1])
                        .labels(axis_labels(x0, x1)),
                )
                .y_axis(
                    Axis::default()
                        .title(chart.y_label.clone())
                        .bounds([y0, y1])
                        .labels(axis_labels(y0, y1)),
                );
            frame.render_widget(widget, area);
        }
    }
}


fn draw_table(frame: &mut Frame, area: Rect, caption: &str, data: &ResultSet) {
    let header = Row::new(data.columns().iter().map(|c| Span::raw(c.clone())))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = data
        .rows()
        .iter()
        .map(|row| Row::new(row.iter().map(format_value)))
        .collect();
    let widths = vec![Constraint::Fill(1); data.columns().len()];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {caption} ")),
    );
    frame.render_widget(table, area);
}


fn series_color(name: &str, index: usize) -> Color {
    match name {
        "Better" => Color::Green,
        "As Expected" => Color::Cyan,
        "Worse" => Color::Red,
        _ => PALETTE[index % PALETTE.len()],
    }
}


/// Widen a degenerate or tight range so single points stay visible.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad, hi + pad)
}


fn axis_labels(lo: f64, hi: f64) -> Vec<Span<'static>> {
    let mid = (lo + hi) / 2.0;
    [lo, mid, hi]
        .iter()
        .map(|v| Span::raw(format!("{v:.1}")))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::testing::demo_loader;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_tab_keys_switch_and_reset_focus() {
        let mut state = DashboardState::new(Tab::Trends, Selection::default());
        state.focus = 1;
        assert_eq!(handle_key(&mut state, press(KeyCode::Tab)), KeyAction::Refresh);
        assert_eq!(state.tab, Tab::Procedures);
        assert_eq!(state.focus, 0);
        handle_key(&mut state, press(KeyCode::Left));
        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.tab, Tab::Map);
        handle_key(&mut state, press(KeyCode::Char('2')));
        assert_eq!(state.tab, Tab::Procedures);
    }

    #[test]
    fn test_quit_and_reload_keys() {
        let mut state = DashboardState::new(Tab::Trends, Selection::default());
        assert_eq!(handle_key(&mut state, press(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key(&mut state, press(KeyCode::Esc)), KeyAction::Quit);
        assert_eq!(handle_key(&mut state, press(KeyCode::Char('r'))), KeyAction::Reload);
        assert_eq!(handle_key(&mut state, press(KeyCode::Char('t'))), KeyAction::Refresh);
        assert!(state.selection.raw);
    }

    #[test]
    fn test_cycling_the_year_selector() {
        let loader = demo_loader();
        let mut state = DashboardState::new(Tab::Procedures, Selection::default());
        state.refresh(&loader);

        // Focus the year selector, which defaults to the latest year
        handle_key(&mut state, press(KeyCode::Char('s')));
        assert_eq!(state.focus, 1);
        assert_eq!(handle_key(&mut state, press(KeyCode::Up)), KeyAction::Refresh);
        assert_eq!(state.selection.year.as_deref(), Some("2020"));

        state.refresh(&loader);
        handle_key(&mut state, press(KeyCode::Down));
        state.refresh(&loader);
        handle_key(&mut state, press(KeyCode::Down));
        // Wraps around past the last year
        assert_eq!(state.selection.year.as_deref(), Some("2016"));
        assert!(state.cache_note.starts_with("1 views cached"));
    }

    #[test]
    fn test_all_fallback_is_part_of_the_cycle() {
        let loader = demo_loader();
        let mut state = DashboardState::new(Tab::Map, Selection::default());
        state.refresh(&loader);
        let options = state.view.as_ref().unwrap().selectors[0].options.len();

        for _ in 0..options {
            handle_key(&mut state, press(KeyCode::Down));
            state.refresh(&loader);
            assert!(state.selection.rating.is_some());
        }
        handle_key(&mut state, press(KeyCode::Down));
        assert_eq!(state.selection.rating, None);
    }

    #[test]
    fn test_refresh_reports_errors_without_panicking() {
        let loader = TableLoader::new(std::sync::Arc::new(
            crate::warehouse::testing::MemoryWarehouse::default(),
        ));
        let mut state = DashboardState::new(Tab::Trends, Selection::default());
        state.refresh(&loader);
        assert!(state.view.is_none());
        assert!(state.error.is_some());
        assert_eq!(state.cache_note, "nothing cached");
    }
}
