//! Command-line entry point.
//!
//! # Responsibility
//! - Open a tracker database and rebuild or print the weekly summary.
//! - Keep output plain and deterministic for scripting.

use carelog_core::db::open_db;
use carelog_core::{
    init_logging, seed_headers, SqliteCollectionStore, SummaryConfig, SummaryService,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "carelog", version, about = "Weekly child-care summary tool")]
struct Cli {
    /// SQLite database file; created when missing.
    #[arg(long)]
    db: PathBuf,

    /// JSON summary configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value = carelog_core::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write canonical headers into empty collections.
    Init,
    /// Rebuild the summary collection and print every row.
    Refresh {
        /// Reference date (YYYY-MM-DD); defaults to the local clock.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Print one user's stored summary.
    Show { username: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&cli.log_level, log_dir)?;
    }
    let config = match &cli.config {
        Some(path) => SummaryConfig::load(path)?,
        None => SummaryConfig::default(),
    };

    let conn = open_db(&cli.db)?;
    let mut store = SqliteCollectionStore::try_new(&conn)?;

    match cli.command {
        Command::Init => {
            let seeded = seed_headers(&mut store, config.user_layout)?;
            for collection in seeded {
                println!("seeded {}", collection.name());
            }
        }
        Command::Refresh { as_of } => {
            let mut service = SummaryService::new(store, config);
            let records = match as_of {
                Some(date) => service.refresh(NaiveDateTime::new(date, NaiveTime::MIN))?,
                None => service.refresh_now()?,
            };
            for row in carelog_core::summary_rows(&records, service.config().feed_aggregation) {
                println!("{}", row.join("\t"));
            }
        }
        Command::Show { username } => {
            let service = SummaryService::new(store, config);
            match service.find_summary(&username)? {
                Some(view) => {
                    for (label, value) in view.fields {
                        println!("{label}: {value}");
                    }
                }
                None => println!("No summary data found."),
            }
        }
    }
    Ok(())
}
