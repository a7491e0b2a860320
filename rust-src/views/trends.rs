//! Statewide trends tab.

use anyhow::Result;

use crate::config::{COUNTY_SUMMARY, STATE_CASE_TREND};
use crate::warehouse::TableLoader;

use super::{series_from, Chart, ChartKind, Fallback, Selection, SelectorState, TablePanel, ViewModel, Tab};


pub fn render(loader: &TableLoader, selection: &Selection) -> Result<ViewModel> {
    let trend = loader.load(STATE_CASE_TREND)?;

    let by_year = trend.sum_by("RPT_YEAR", "CASE_COUNT")?;
    let cases = Chart {
        kind: ChartKind::Bar,
        title: "Statewide cases by year".to_string(),
        x_label: "RPT_YEAR".to_string(),
        y_label: "CASE_COUNT".to_string(),
        series: vec![series_from(&by_year, "Cases", "RPT_YEAR", None, "CASE_COUNT")?],
    };

    let summary = loader.load(COUNTY_SUMMARY)?;
    let county = SelectorState::bind(
        "County",
        "COUNTY",
        summary.unique("COUNTY")?,
        selection.county.as_deref(),
        Fallback::First,
    );
    let county_rows = county.apply(&summary)?.sort_asc("RPT_YEAR")?;

    let mortality = Chart {
        kind: ChartKind::Line,
        title: format!("Mortality rate in {} County", county.display()),
        x_label: "RPT_YEAR".to_string(),
        y_label: "MORTALITY_RATE".to_string(),
        series: vec![series_from(
            &county_rows,
            county.display(),
            "RPT_YEAR",
            Some("RPT_YEAR"),
            "MORTALITY_RATE",
        )?],
    };

    let tables = vec![
        TablePanel {
            caption: format!("{} County by year", county.display()),
            data: county_rows.select(&["RPT_YEAR", "CASE_COUNT", "DEATH_COUNT", "MORTALITY_RATE"])?,
            collapsed: false,
        },
        TablePanel {
            caption: "See Table".to_string(),
            data: trend.as_ref().clone(),
            collapsed: !selection.raw,
        },
    ];

    Ok(ViewModel {
        tab: Tab::Trends,
        title: Tab::Trends.title().to_string(),
        selectors: vec![county],
        charts: vec![cases, mortality],
        tables,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::testing::demo_loader;

    #[test]
    fn test_years_in_order_with_totals() {
        let loader = demo_loader();
        let view = render(&loader, &Selection::default()).unwrap();

        let bars = &view.charts[0].series[0].points;
        let labels: Vec<&str> = bars.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2016", "2017", "2018", "2019", "2020", "2021"]);
        assert!(bars.iter().all(|p| p.y > 0.0));

        // The raw table stays collapsed by default
        assert!(view.tables[1].collapsed);
    }

    #[test]
    fn test_county_selection_filters_line() {
        let loader = demo_loader();
        let selection = Selection {
            county: Some("Fresno".into()),
            raw: true,
            ..Default::default()
        };
        let view = render(&loader, &selection).unwrap();

        assert_eq!(view.selectors[0].display(), "Fresno");
        assert_eq!(view.charts[1].series[0].points.len(), 6);
        assert_eq!(view.tables[0].data.len(), 6);
        assert!(!view.tables[1].collapsed);
    }

    #[test]
    fn test_unknown_county_renders_empty() {
        let loader = demo_loader();
        let selection = Selection {
            county: Some("Inyo".into()),
            ..Default::default()
        };
        let view = render(&loader, &selection).unwrap();
        assert!(view.charts[1].is_empty());
        assert!(view.tables[0].data.is_empty());
    }
}
