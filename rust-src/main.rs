//! Hospital Performance Measures CLI
//!
//! Inpatient mortality indicators for California hospitals, read from
//! pre-aggregated warehouse views.

mod cli;
mod commands;
mod config;
mod models;
mod transform;
mod views;
mod visualization;
mod warehouse;


fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
