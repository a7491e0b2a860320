//! Page configuration, source view names and default paths.

use std::path::PathBuf;


/// Page header and window title.
pub const PAGE_TITLE: &str = "Hospital Performance Measures";

pub const PAGE_ICON: &str = "🩺";

pub const HELP_URL: &str = "https://hcai.ca.gov/data/healthcare-quality/";

pub const ABOUT: &str = "This app allows California citizens to easily lookup \
                         hospital performance metrics";

/// Footer shown under every tab.
pub const CAPTION: &str = "Powered by pre-aggregated hospital performance views | Made with hpm";

/// Rows shown in ranked charts unless overridden.
pub const DEFAULT_TOP_N: usize = 10;

pub const DEFAULT_DATABASE: &str = "HOSPITAL_DB";
pub const DEFAULT_SCHEMA: &str = "PUBLIC";


// Source views
pub const STATE_CASE_TREND: &str = "HOSPITAL_DB.PUBLIC.STATE_CASE_TREND";
pub const PROCEDURE_RATES: &str = "HOSPITAL_DB.PUBLIC.PROCEDURE_RATES";
pub const HOSPITAL_IMI_TREND: &str = "HOSPITAL_DB.PUBLIC.HOSPITAL_IMI_TREND";
pub const HOSPITAL_LOCATIONS: &str = "HOSPITAL_DB.PUBLIC.HOSPITAL_LOCATIONS";
pub const COUNTY_SUMMARY: &str = "HOSPITAL_DB.PUBLIC.COUNTY_SUMMARY";
pub const RATING_SUMMARY: &str = "HOSPITAL_DB.PUBLIC.RATING_SUMMARY";

/// Every view the dashboard reads, in tab order.
pub const SOURCE_VIEWS: [&str; 6] = [
    STATE_CASE_TREND,
    COUNTY_SUMMARY,
    PROCEDURE_RATES,
    HOSPITAL_IMI_TREND,
    HOSPITAL_LOCATIONS,
    RATING_SUMMARY,
];


/// Resolve a short view name (`procedure-rates`) to its identifier.
///
/// Anything else is returned unchanged so callers can pass full
/// identifiers through.
pub fn resolve_view_name(name: &str) -> String {
    let wanted = name.replace('-', "_").to_uppercase();
    SOURCE_VIEWS
        .iter()
        .find(|v| v.rsplit('.').next() == Some(wanted.as_str()))
        .map(|v| v.to_string())
        .unwrap_or_else(|| name.to_string())
}


/// Application directory under the platform config dir.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hospital-performance")
}


/// Default location of the secrets file.
pub fn get_secrets_path() -> PathBuf {
    get_config_dir().join("secrets.toml")
}


/// Default location of the warehouse database file.
pub fn get_warehouse_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hospital-performance")
        .join("warehouse.db")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(PAGE_TITLE, "Hospital Performance Measures");
        assert_eq!(DEFAULT_TOP_N, 10);
        assert_eq!(SOURCE_VIEWS.len(), 6);
        assert!(ABOUT.contains("allows California citizens to easily lookup hospital performance metrics"));
        assert!(CAPTION.starts_with("Powered by"));
    }

    #[test]
    fn test_views_share_namespace() {
        let prefix = format!("{DEFAULT_DATABASE}.{DEFAULT_SCHEMA}.");
        assert!(SOURCE_VIEWS.iter().all(|v| v.starts_with(&prefix)));
    }

    #[test]
    fn test_resolve_view_name() {
        assert_eq!(resolve_view_name("procedure-rates"), PROCEDURE_RATES);
        assert_eq!(resolve_view_name("STATE_CASE_TREND"), STATE_CASE_TREND);
        assert_eq!(resolve_view_name("OTHER.PUBLIC.X"), "OTHER.PUBLIC.X");
    }

    #[test]
    fn test_default_paths() {
        assert!(get_secrets_path().to_string_lossy().contains("hospital-performance"));
        assert!(get_warehouse_path().to_string_lossy().ends_with("warehouse.db"));
    }
}
