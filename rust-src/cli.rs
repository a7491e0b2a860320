//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::config::{ABOUT, HELP_URL};
use crate::views::{Selection, Tab};


/// Hospital Performance Measures - inpatient mortality dashboard
#[derive(Parser)]
#[command(name = "hpm")]
#[command(author, version, about, long_about = ABOUT)]
#[command(after_help = format!("Data notes and methodology: {HELP_URL}"))]
pub struct Cli {
    /// Secrets file with the [warehouse] section
    #[arg(long, global = true, env = "HPM_SECRETS")]
    secrets: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}


#[derive(Subcommand)]
enum Commands {
    /// Connect to the warehouse and count the rows of every source view
    Check,

    /// Write a demo warehouse with synthetic data
    Seed {
        /// Database file (default: the configured warehouse path)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List the unique values of a column
    Values {
        /// View short name (procedure-rates) or identifier
        view: String,

        /// Column name
        column: String,
    },

    /// Render one dashboard tab to the terminal
    Show {
        #[arg(value_enum)]
        tab: Tab,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive dashboard
    Dashboard {
        /// Tab to open on
        #[arg(value_enum, default_value = "trends")]
        tab: Tab,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Export a tab's chart as PNG or SVG
    Export {
        #[arg(value_enum)]
        tab: Tab,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Export as SVG instead of PNG
        #[arg(long)]
        svg: bool,

        /// Open file after export
        #[arg(long)]
        open: bool,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}


/// Selector values shared by the rendering commands.
#[derive(Args, Debug, Default)]
struct SelectionArgs {
    /// Procedure name
    #[arg(long)]
    procedure: Option<String>,

    /// Report year
    #[arg(long)]
    year: Option<String>,

    /// Hospital name
    #[arg(long)]
    hospital: Option<String>,

    /// County
    #[arg(long)]
    county: Option<String>,

    /// Hospital rating (Better, As Expected, Worse)
    #[arg(long)]
    rating: Option<String>,

    /// Only hospitals with at least this many cases
    #[arg(long)]
    min_cases: Option<i64>,

    /// Number of bars in ranking charts
    #[arg(long)]
    top: Option<usize>,

    /// Expand the raw data tables
    #[arg(long)]
    raw: bool,
}


impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Selection {
            procedure: args.procedure,
            year: args.year,
            hospital: args.hospital,
            county: args.county,
            rating: args.rating,
            min_cases: args.min_cases,
            top: args.top,
            raw: args.raw,
        }
    }
}


/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}


/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let secrets = cli.secrets.as_deref();

    match cli.command {
        Some(Commands::Check) => commands::check::run(secrets),
        Some(Commands::Seed { path, force }) => commands::seed::run(secrets, path, force),
        Some(Commands::Values { view, column }) => commands::values::run(secrets, &view, &column),
        Some(Commands::Show { tab, selection, json }) => {
            commands::show::run(secrets, tab, selection.into(), json)
        }
        Some(Commands::Dashboard { tab, selection }) => {
            commands::dashboard::run(secrets, tab, selection.into())
        }
        Some(Commands::Export { tab, selection, svg, open, output }) => {
            commands::export::run(secrets, tab, selection.into(), svg, open, output)
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_parses_selectors() {
        let cli = Cli::try_parse_from([
            "hpm", "show", "procedures", "--procedure", "PCI", "--year", "2019", "--top", "3", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Show { tab, selection, json }) => {
                assert_eq!(tab, Tab::Procedures);
                assert!(!json);
                let selection: Selection = selection.into();
                assert_eq!(selection.procedure.as_deref(), Some("PCI"));
                assert_eq!(selection.top(), 3);
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_unknown_tab_is_rejected() {
        assert!(Cli::try_parse_from(["hpm", "show", "billing"]).is_err());
    }
}
