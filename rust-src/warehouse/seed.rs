//! Demo warehouse with the six dashboard views.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};


/// Row counts written by a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub hospitals: usize,
    pub outcomes: usize,
}


// (name, county, latitude, longitude, mortality bias)
const HOSPITALS: [(&str, &str, f64, f64, f64); 10] = [
    ("Alta Bates Summit Medical Center", "Alameda", 37.8562, -122.2572, 1.00),
    ("Kaiser Foundation Hospital - Oakland", "Alameda", 37.8246, -122.2566, 0.55),
    ("UCSF Medical Center", "San Francisco", 37.7631, -122.4578, 0.80),
    ("Stanford Health Care", "Santa Clara", 37.4337, -122.1756, 0.55),
    ("Cedars-Sinai Medical Center", "Los Angeles", 34.0754, -118.3804, 1.00),
    ("Ronald Reagan UCLA Medical Center", "Los Angeles", 34.0663, -118.4455, 0.80),
    ("Scripps Memorial Hospital - La Jolla", "San Diego", 32.8853, -117.2254, 1.20),
    ("UC Davis Medical Center", "Sacramento", 38.5537, -121.4556, 1.00),
    ("Community Regional Medical Center", "Fresno", 36.7432, -119.7836, 1.45),
    ("Loma Linda University Medical Center", "San Bernardino", 34.0500, -117.2633, 1.20),
];

// (name, expected deaths per case, typical yearly volume)
const PROCEDURES: [(&str, f64, i64); 6] = [
    ("AAA Repair", 0.045, 40),
    ("Carotid Endarterectomy", 0.008, 60),
    ("Craniotomy", 0.062, 90),
    ("Esophageal Resection", 0.035, 12),
    ("Pancreatic Resection", 0.030, 25),
    ("PCI", 0.021, 300),
];

const FIRST_YEAR: i64 = 2016;
const LAST_YEAR: i64 = 2021;

const RATING_SQL: &str = "CASE
    WHEN DEATH_COUNT > 1.25 * EXPECTED_DEATHS THEN 'Worse'
    WHEN DEATH_COUNT < 0.75 * EXPECTED_DEATHS THEN 'Better'
    ELSE 'As Expected' END";

const SCHEMA_SQL: &str = "
CREATE TABLE HOSPITALS (
    HOSPITAL_NAME TEXT PRIMARY KEY,
    COUNTY TEXT NOT NULL,
    LATITUDE REAL NOT NULL,
    LONGITUDE REAL NOT NULL
);

CREATE TABLE OUTCOMES (
    RPT_YEAR INTEGER NOT NULL,
    HOSPITAL_NAME TEXT NOT NULL REFERENCES HOSPITALS(HOSPITAL_NAME),
    PROCEDURE_NAME TEXT NOT NULL,
    CASE_COUNT INTEGER NOT NULL,
    DEATH_COUNT INTEGER NOT NULL,
    EXPECTED_DEATHS REAL NOT NULL,
    UNIQUE(RPT_YEAR, HOSPITAL_NAME, PROCEDURE_NAME)
);

CREATE VIEW STATE_CASE_TREND AS
    SELECT RPT_YEAR, PROCEDURE_NAME,
           SUM(CASE_COUNT) AS CASE_COUNT,
           SUM(DEATH_COUNT) AS DEATH_COUNT
    FROM OUTCOMES
    GROUP BY RPT_YEAR, PROCEDURE_NAME
    ORDER BY RPT_YEAR, PROCEDURE_NAME;

CREATE VIEW COUNTY_SUMMARY AS
    SELECT h.COUNTY, o.RPT_YEAR,
           SUM(o.CASE_COUNT) AS CASE_COUNT,
           SUM(o.DEATH_COUNT) AS DEATH_COUNT,
           ROUND(100.0 * SUM(o.DEATH_COUNT) / SUM(o.CASE_COUNT), 2) AS MORTALITY_RATE
    FROM OUTCOMES o JOIN HOSPITALS h ON h.HOSPITAL_NAME = o.HOSPITAL_NAME
    GROUP BY h.COUNTY, o.RPT_YEAR
    ORDER BY h.COUNTY, o.RPT_YEAR;
";


/// Create (or with `force`, recreate) the demo warehouse at `db_path`.
pub fn seed_demo_warehouse(db_path: &Path, force: bool) -> Result<SeedSummary> {
    if db_path.exists() {
        if !force {
            anyhow::bail!(
                "Warehouse already exists at {}. Use --force to overwrite.",
                db_path.display()
            );
        }
        std::fs::remove_file(db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
    }

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    seed_connection(&mut conn).context("Failed to seed demo warehouse")
}


/// Write the demo schema, views and rows into an open connection.
pub fn seed_connection(conn: &mut Connection) -> rusqlite::Result<SeedSummary> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(&derived_views_sql())?;

    let tx = conn.transaction()?;
    let mut outcomes = 0;

    for (name, county, lat, lon, _) in HOSPITALS {
        tx.execute(
            "INSERT INTO HOSPITALS (HOSPITAL_NAME, COUNTY, LATITUDE, LONGITUDE)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, county, lat, lon],
        )?;
    }

    for (h, (hospital, _, _, _, bias)) in HOSPITALS.iter().enumerate() {
        for (p, (procedure, rate, volume)) in PROCEDURES.iter().enumerate() {
            for year in FIRST_YEAR..=LAST_YEAR {
                let (cases, deaths, expected) = outcome(h, p, year, *rate, *volume, *bias);
                tx.execute(
                    "INSERT INTO OUTCOMES (
                        RPT_YEAR, HOSPITAL_NAME, PROCEDURE_NAME,
                        CASE_COUNT, DEATH_COUNT, EXPECTED_DEATHS
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![year, *hospital, *procedure, cases, deaths, expected],
                )?;
                outcomes += 1;
            }
        }
    }

    tx.commit()?;

    Ok(SeedSummary {
        hospitals: HOSPITALS.len(),
        outcomes,
    })
}


/// Views that classify results against expected deaths.
fn derived_views_sql() -> String {
    format!(
        "
CREATE VIEW PROCEDURE_RATES AS
    SELECT o.RPT_YEAR, o.HOSPITAL_NAME, h.COUNTY, o.PROCEDURE_NAME,
           o.CASE_COUNT, o.DEATH_COUNT,
           ROUND(100.0 * o.DEATH_COUNT / o.CASE_COUNT, 2) AS MORTALITY_RATE,
           {rating} AS HOSPITAL_RATING
    FROM OUTCOMES o JOIN HOSPITALS h ON h.HOSPITAL_NAME = o.HOSPITAL_NAME
    ORDER BY o.RPT_YEAR, o.HOSPITAL_NAME, o.PROCEDURE_NAME;

CREATE VIEW HOSPITAL_IMI_TREND AS
    SELECT HOSPITAL_NAME, PROCEDURE_NAME, RPT_YEAR,
           ROUND(DEATH_COUNT / EXPECTED_DEATHS, 2) AS IMI_RATIO,
           {rating} AS HOSPITAL_RATING
    FROM OUTCOMES
    ORDER BY HOSPITAL_NAME, PROCEDURE_NAME, RPT_YEAR;

CREATE VIEW HOSPITAL_LOCATIONS AS
    SELECT HOSPITAL_NAME, COUNTY, LATITUDE, LONGITUDE, CASE_COUNT,
           {rating} AS HOSPITAL_RATING
    FROM (
        SELECT h.HOSPITAL_NAME, h.COUNTY, h.LATITUDE, h.LONGITUDE,
               SUM(o.CASE_COUNT) AS CASE_COUNT,
               SUM(o.DEATH_COUNT) AS DEATH_COUNT,
               SUM(o.EXPECTED_DEATHS) AS EXPECTED_DEATHS
        FROM HOSPITALS h JOIN OUTCOMES o ON o.HOSPITAL_NAME = h.HOSPITAL_NAME
        GROUP BY h.HOSPITAL_NAME
    )
    ORDER BY HOSPITAL_NAME;

CREATE VIEW RATING_SUMMARY AS
    SELECT RPT_YEAR, HOSPITAL_RATING, COUNT(DISTINCT HOSPITAL_NAME) AS HOSPITAL_COUNT
    FROM PROCEDURE_RATES
    GROUP BY RPT_YEAR, HOSPITAL_RATING
    ORDER BY RPT_YEAR, HOSPITAL_RATING;
",
        rating = RATING_SQL
    )
}


/// Deterministic (cases, deaths, expected deaths) for one hospital,
/// procedure and year.
fn outcome(h: usize, p: usize, year: i64, rate: f64, volume: i64, bias: f64) -> (i64, i64, f64) {
    let y = (year - FIRST_YEAR) as usize;

    let volume_pct = 80 + (h * 37 + p * 11 + y * 7) % 41;
    let cases = ((volume * volume_pct as i64) / 100).max(1);

    let expected = cases as f64 * rate;
    let noise = ((h * 53 + p * 29 + y * 17) % 7) as f64 - 3.0;
    let factor = (bias + noise * 0.08).max(0.0);
    let deaths = (expected * factor).round() as i64;

    (cases, deaths, (expected * 100.0).round() / 100.0)
}
