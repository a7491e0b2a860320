//! Configuration and settings for the hospital performance dashboard.

mod secrets;
mod settings;

#[allow(unused_imports)]
pub use settings::{
    get_config_dir,
    get_secrets_path,
    get_warehouse_path,
    resolve_view_name,
    ABOUT,
    CAPTION,
    COUNTY_SUMMARY,
    DEFAULT_DATABASE,
    DEFAULT_SCHEMA,
    DEFAULT_TOP_N,
    HELP_URL,
    HOSPITAL_IMI_TREND,
    HOSPITAL_LOCATIONS,
    PAGE_ICON,
    PAGE_TITLE,
    PROCEDURE_RATES,
    RATING_SUMMARY,
    SOURCE_VIEWS,
    STATE_CASE_TREND,
};

#[allow(unused_imports)]
pub use secrets::{load_secrets, Secrets, SecretsError, WarehouseConfig};
