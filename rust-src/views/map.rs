//! Hospital map tab.

use anyhow::Result;

use crate::config::{HOSPITAL_LOCATIONS, RATING_SUMMARY};
use crate::warehouse::TableLoader;

use super::{series_from, Chart, ChartKind, Fallback, Selection, SelectorState, TablePanel, ViewModel, Tab};


pub fn render(loader: &TableLoader, selection: &Selection) -> Result<ViewModel> {
    let locations = loader.load(HOSPITAL_LOCATIONS)?;

    let mut ratings = locations.unique("HOSPITAL_RATING")?;
    ratings.sort_by(|a, b| a.total_cmp(b));
    let rating = SelectorState::bind(
        "Rating",
        "HOSPITAL_RATING",
        ratings,
        selection.rating.as_deref(),
        Fallback::All,
    );

    let mut shown = rating.apply(&locations)?;
    if let Some(min) = selection.min_cases {
        shown = shown.filter_range("CASE_COUNT", Some(min as f64), None)?;
    }

    // One series per rating so each category gets its own marker colour
    let series = shown
        .unique("HOSPITAL_RATING")?
        .iter()
        .map(|r| {
            let rows = shown.filter_eq("HOSPITAL_RATING", r)?;
            series_from(&rows, r.to_string(), "HOSPITAL_NAME", Some("LONGITUDE"), "LATITUDE")
        })
        .collect::<Result<Vec<_>, _>>()?;

    let chart = Chart {
        kind: ChartKind::ScatterGeo,
        title: format!("Hospitals rated {}", rating.display()),
        x_label: "LONGITUDE".to_string(),
        y_label: "LATITUDE".to_string(),
        series,
    };

    let summary = rating.apply(loader.load(RATING_SUMMARY)?.as_ref())?;
    let by_year = summary.pivot("HOSPITAL_RATING", "RPT_YEAR", "HOSPITAL_COUNT")?;

    let tables = vec![
        TablePanel {
            caption: format!("{} hospitals", shown.len()),
            data: shown
                .select(&["HOSPITAL_NAME", "COUNTY", "CASE_COUNT", "HOSPITAL_RATING"])?
                .sort_desc("CASE_COUNT")?,
            collapsed: false,
        },
        TablePanel {
            caption: "Hospitals per rating by year".to_string(),
            data: by_year.to_result_set(),
            collapsed: false,
        },
    ];

    Ok(ViewModel {
        tab: Tab::Map,
        title: Tab::Map.title().to_string(),
        selectors: vec![rating],
        charts: vec![chart],
        tables,
    })
}
