//! Dashboard tabs as backend-neutral view models.
//!
//! Each tab reads its views through the [`TableLoader`], applies its
//! selections and returns a [`ViewModel`] that the terminal, TUI and
//! export backends draw.

mod hospitals;
mod map;
mod procedures;
mod trends;

use anyhow::Result;
use serde::Serialize;

use crate::config::DEFAULT_TOP_N;
use crate::models::{FrameError, ResultSet, Value};
use crate::warehouse::TableLoader;


/// The four dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Trends,
    Procedures,
    Hospitals,
    Map,
}


impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Trends, Tab::Procedures, Tab::Hospitals, Tab::Map];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Trends => "Statewide Trends",
            Tab::Procedures => "Procedures",
            Tab::Hospitals => "Hospitals",
            Tab::Map => "Map",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}


/// User choices bound to the tab selectors.
///
/// `None` means "use the selector's default".
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub procedure: Option<String>,
    pub year: Option<String>,
    pub hospital: Option<String>,
    pub county: Option<String>,
    pub rating: Option<String>,
    pub min_cases: Option<i64>,
    pub top: Option<usize>,
    /// Expand the raw-table panels.
    pub raw: bool,
}


impl Selection {
    pub fn top(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP_N)
    }

    /// Set (or with `None`, reset) the selector bound to `column`.
    pub fn set(&mut self, column: &str, value: Option<String>) {
        match column {
            "PROCEDURE_NAME" => self.procedure = value,
            "RPT_YEAR" => self.year = value,
            "HOSPITAL_NAME" => self.hospital = value,
            "COUNTY" => self.county = value,
            "HOSPITAL_RATING" => self.rating = value,
            _ => {}
        }
    }
}


/// Which option a selector falls back to when nothing is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    First,
    Last,
    /// No filtering at all.
    All,
}


/// A select box bound to the unique values of a column.
#[derive(Debug, Clone, Serialize)]
pub struct SelectorState {
    pub label: &'static str,
    pub column: &'static str,
    pub options: Vec<Value>,
    /// Effective selection; `None` only for `Fallback::All` (or no options).
    pub value: Option<Value>,
    pub fallback: Fallback,
}


impl SelectorState {
    /// Bind a selector, resolving the requested value against `options`.
    ///
    /// A requested value that is not an option is kept as-is, so the
    /// resulting selection is simply empty.
    pub fn bind(
        label: &'static str,
        column: &'static str,
        options: Vec<Value>,
        wanted: Option<&str>,
        fallback: Fallback,
    ) -> Self {
        let value = match wanted {
            Some(w) => {
                let parsed = Value::parse_input(w);
                Some(
                    options
                        .iter()
                        .find(|o| o.matches(&parsed) || o.to_string() == w)
                        .cloned()
                        .unwrap_or(parsed),
                )
            }
            None => match fallback {
                Fallback::First => options.first().cloned(),
                Fallback::Last => options.last().cloned(),
                Fallback::All => None,
            },
        };

        Self {
            label,
            column,
            options,
            value,
            fallback,
        }
    }

    /// Position of the current value among the options.
    pub fn selected_index(&self) -> Option<usize> {
        let value = self.value.as_ref()?;
        self.options.iter().position(|o| o.matches(value))
    }

    /// Display text for the current value.
    pub fn display(&self) -> String {
        match &self.value {
            Some(v) => v.to_string(),
            None if self.fallback == Fallback::All => "All".to_string(),
            None => "(none)".to_string(),
        }
    }

    /// Apply the selection as an equality filter.
    pub fn apply(&self, rs: &ResultSet) -> Result<ResultSet, FrameError> {
        match &self.value {
            Some(v) => rs.filter_eq(self.column, v),
            None if self.fallback == Fallback::All => {
                rs.column_index(self.column)?;
                Ok(rs.clone())
            }
            None => {
                rs.column_index(self.column)?;
                Ok(rs.empty_like())
            }
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    ScatterGeo,
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub x: f64,
    pub y: f64,
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}


#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}


impl Chart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// Smallest and largest x and y across all series.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut points = self.series.iter().flat_map(|s| &s.points);
        let first = points.next()?;
        let init = ((first.x, first.x), (first.y, first.y));
        Some(points.fold(init, |((x0, x1), (y0, y1)), p| {
            ((x0.min(p.x), x1.max(p.x)), (y0.min(p.y), y1.max(p.y)))
        }))
    }
}


/// A table with a caption; collapsed panels are the "See Table" expanders.
#[derive(Debug, Clone, Serialize)]
pub struct TablePanel {
    pub caption: String,
    pub data: ResultSet,
    pub collapsed: bool,
}


/// Everything one tab shows.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub tab: Tab,
    pub title: String,
    pub selectors: Vec<SelectorState>,
    pub charts: Vec<Chart>,
    pub tables: Vec<TablePanel>,
}


/// Run the renderer for `tab`.
pub fn render_view(tab: Tab, loader: &TableLoader, selection: &Selection) -> Result<ViewModel> {
    match tab {
        Tab::Trends => trends::render(loader, selection),
        Tab::Procedures => procedures::render(loader, selection),
        Tab::Hospitals => hospitals::render(loader, selection),
        Tab::Map => map::render(loader, selection),
    }
}


/// One series from two columns. Rows with a non-numeric y are skipped;
/// when `x_col` is `None` the row position is used.
pub(crate) fn series_from(
    rs: &ResultSet,
    name: impl Into<String>,
    label_col: &str,
    x_col: Option<&str>,
    y_col: &str,
) -> Result<Series, FrameError> {
    let li = rs.column_index(label_col)?;
    let xi = x_col.map(|c| rs.column_index(c)).transpose()?;
    let yi = rs.column_index(y_col)?;

    let points = rs
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(pos, row)| {
            let y = row[yi].as_f64()?;
            let x = match xi {
                Some(i) => row[i].as_f64()?,
                None => pos as f64,
            };
            Some(Point {
                label: row[li].to_string(),
                x,
                y,
            })
        })
        .collect();

    Ok(Series {
        name: name.into(),
        points,
    })
}


/// One series per distinct value of `group_col`.
pub(crate) fn grouped_series(
    rs: &ResultSet,
    group_col: &str,
    label_col: &str,
    x_col: &str,
    y_col: &str,
) -> Result<Vec<Series>, FrameError> {
    rs.unique(group_col)?
        .iter()
        .map(|group| {
            let rows = rs.filter_eq(group_col, group)?.sort_asc(x_col)?;
            series_from(&rows, group.to_string(), label_col, Some(x_col), y_col)
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::testing::demo_loader;

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Trends.next(), Tab::Procedures);
        assert_eq!(Tab::Map.next(), Tab::Trends);
        assert_eq!(Tab::Trends.prev(), Tab::Map);
    }

    #[test]
    fn test_selector_defaults() {
        let options = vec![Value::Int(2019), Value::Int(2020), Value::Int(2021)];
        let first = SelectorState::bind("Year", "RPT_YEAR", options.clone(), None, Fallback::First);
        assert_eq!(first.value, Some(Value::Int(2019)));
        let last = SelectorState::bind("Year", "RPT_YEAR", options.clone(), None, Fallback::Last);
        assert_eq!(last.selected_index(), Some(2));
        let all = SelectorState::bind("Year", "RPT_YEAR", options, None, Fallback::All);
        assert_eq!(all.display(), "All");
    }

    #[test]
    fn test_selector_parses_requested_value() {
        let options = vec![Value::Int(2019), Value::Int(2020)];
        let sel = SelectorState::bind("Year", "RPT_YEAR", options, Some("2020"), Fallback::First);
        assert_eq!(sel.selected_index(), Some(1));
    }

    #[test]
    fn test_unknown_selection_is_kept_and_selects_nothing() {
        let rs = ResultSet::new(
            vec!["COUNTY".into()],
            vec![vec![Value::from("Fresno")]],
        )
        .unwrap();
        let sel = SelectorState::bind(
            "County",
            "COUNTY",
            rs.unique("COUNTY").unwrap(),
            Some("Inyo"),
            Fallback::First,
        );
        assert_eq!(sel.selected_index(), None);
        assert!(sel.apply(&rs).unwrap().is_empty());
    }

    #[test]
    fn test_selection_set() {
        let mut selection = Selection::default();
        selection.set("HOSPITAL_RATING", Some("Worse".into()));
        assert_eq!(selection.rating.as_deref(), Some("Worse"));
        selection.set("RPT_YEAR", Some("2020".into()));
        assert_eq!(selection.year.as_deref(), Some("2020"));
        selection.set("HOSPITAL_RATING", None);
        assert_eq!(selection.rating, None);
        assert_eq!(selection.top(), DEFAULT_TOP_N);
    }

    #[test]
    fn test_every_tab_renders_from_demo_warehouse() {
        let loader = demo_loader();
        for tab in Tab::ALL {
            let view = render_view(tab, &loader, &Selection::default()).unwrap();
            assert_eq!(view.tab, tab);
            assert!(!view.charts.is_empty(), "{tab:?} has no chart");
            assert!(view.charts.iter().all(|c| !c.is_empty()), "{tab:?} has an empty chart");
        }
        // Six views, each fetched once
        assert_eq!(loader.cached().len(), 6);
    }

    #[test]
    fn test_chart_bounds() {
        let chart = Chart {
            kind: ChartKind::Line,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            series: vec![Series {
                name: "a".into(),
                points: vec![
                    Point { label: "p".into(), x: 1.0, y: 5.0 },
                    Point { label: "q".into(), x: 3.0, y: -1.0 },
                ],
            }],
        };
        assert_eq!(chart.bounds(), Some(((1.0, 3.0), (-1.0, 5.0))));
    }
}
