//! Procedure ranking tab.

use anyhow::Result;

use crate::config::PROCEDURE_RATES;
use crate::warehouse::TableLoader;

use super::{series_from, Chart, ChartKind, Fallback, Selection, SelectorState, TablePanel, ViewModel, Tab};


const RANKED_COLUMNS: [&str; 6] = [
    "HOSPITAL_NAME",
    "COUNTY",
    "CASE_COUNT",
    "DEATH_COUNT",
    "MORTALITY_RATE",
    "HOSPITAL_RATING",
];


pub fn render(loader: &TableLoader, selection: &Selection) -> Result<ViewModel> {
    let rates = loader.load(PROCEDURE_RATES)?;

    let procedure = SelectorState::bind(
        "Procedure",
        "PROCEDURE_NAME",
        rates.unique("PROCEDURE_NAME")?,
        selection.procedure.as_deref(),
        Fallback::First,
    );

    let mut years = rates.unique("RPT_YEAR")?;
    years.sort_by(|a, b| a.total_cmp(b));
    let year = SelectorState::bind("Year", "RPT_YEAR", years, selection.year.as_deref(), Fallback::Last);

    let ranked = year
        .apply(&procedure.apply(&rates)?)?
        .sort_desc("MORTALITY_RATE")?
        .select(&RANKED_COLUMNS)?;

    let top = ranked.head(selection.top());
    let chart = Chart {
        kind: ChartKind::Bar,
        title: format!(
            "Highest mortality: {} ({})",
            procedure.display(),
            year.display()
        ),
        x_label: "HOSPITAL_NAME".to_string(),
        y_label: "MORTALITY_RATE".to_string(),
        series: vec![series_from(&top, procedure.display(), "HOSPITAL_NAME", None, "MORTALITY_RATE")?],
    };

    let table = TablePanel {
        caption: format!("{} hospitals ranked by mortality rate", ranked.len()),
        data: ranked,
        collapsed: false,
    };

    Ok(ViewModel {
        tab: Tab::Procedures,
        title: Tab::Procedures.title().to_string(),
        selectors: vec![procedure, year],
        charts: vec![chart],
        tables: vec![table],
    })
}
