//! Per-hospital ratings tab.

use anyhow::Result;

use crate::config::HOSPITAL_IMI_TREND;
use crate::warehouse::TableLoader;

use super::{grouped_series, Chart, ChartKind, Fallback, Selection, SelectorState, TablePanel, ViewModel, Tab};


pub fn render(loader: &TableLoader, selection: &Selection) -> Result<ViewModel> {
    let imi = loader.load(HOSPITAL_IMI_TREND)?;

    let hospital = SelectorState::bind(
        "Hospital",
        "HOSPITAL_NAME",
        imi.unique("HOSPITAL_NAME")?,
        selection.hospital.as_deref(),
        Fallback::First,
    );
    let rows = hospital.apply(&imi)?;

    let ratings = rows.pivot("PROCEDURE_NAME", "RPT_YEAR", "HOSPITAL_RATING")?;

    let chart = Chart {
        kind: ChartKind::Line,
        title: format!("IMI ratio by year: {}", hospital.display()),
        x_label: "RPT_YEAR".to_string(),
        y_label: "IMI_RATIO".to_string(),
        series: grouped_series(&rows, "PROCEDURE_NAME", "RPT_YEAR", "RPT_YEAR", "IMI_RATIO")?,
    };

    let tables = vec![
        TablePanel {
            caption: "Rating by procedure and year".to_string(),
            data: ratings.to_result_set(),
            collapsed: false,
        },
        TablePanel {
            caption: "See Table".to_string(),
            data: rows,
            collapsed: !selection.raw,
        },
    ];

    Ok(ViewModel {
        tab: Tab::Hospitals,
        title: Tab::Hospitals.title().to_string(),
        selectors: vec![hospital],
        charts: vec![chart],
        tables,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::warehouse::testing::demo_loader;

    #[test]
    fn test_pivot_rows_are_procedures_and_columns_years() {
        let loader = demo_loader();
        let selection = Selection {
            hospital: Some("UCSF Medical Center".into()),
            ..Default::default()
        };
        let view = render(&loader, &selection).unwrap();

        let wide = &view.tables[0].data;
        assert_eq!(
            wide.columns(),
            &["PROCEDURE_NAME", "2016", "2017", "2018", "2019", "2020", "2021"]
        );
        assert_eq!(wide.len(), 6);
        assert_eq!(wide.rows()[0][0], Value::from("AAA Repair"));

        let ratings = ["Better", "As Expected", "Worse"];
        assert!(wide
            .rows()
            .iter()
            .flat_map(|r| &r[1..])
            .all(|v| ratings.contains(&v.to_string().as_str())));
    }

    #[test]
    fn test_one_series_per_procedure() {
        let loader = demo_loader();
        let view = render(&loader, &Selection::default()).unwrap();
        let chart = &view.charts[0];
        assert_eq!(chart.series.len(), 6);
        assert!(chart.series.iter().all(|s| s.points.len() == 6));
    }

    #[test]
    fn test_pivot_melts_back_to_selection() {
        let loader = demo_loader();
        let view = render(&loader, &Selection::default()).unwrap();
        let long = &view.tables[1].data;

        let melted = long
            .pivot("PROCEDURE_NAME", "RPT_YEAR", "HOSPITAL_RATING")
            .unwrap()
            .melt();
        assert_eq!(melted.len(), long.len());
    }
}
