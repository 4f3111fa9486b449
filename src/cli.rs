mod export;
mod report;
mod source;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

pub use self::{export::export, report::report};
use crate::{cli::source::SourceArgs, core::billing::Summation};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: price the sessions of one vehicle within a date range and write the reports.
    #[clap(name = "report")]
    Report(Box<ReportArgs>),

    /// Export all sessions with their prices as CSV.
    #[clap(name = "export")]
    Export(Box<ExportArgs>),
}

#[derive(Parser)]
pub struct ReportArgs {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Case-insensitive substring of the chip name, for example `Volvo`.
    #[clap(long, short = 'i', env = "IDENTIFIER")]
    pub identifier: String,

    /// First day of the report, `YYYY-MM-DD`.
    #[clap(long, env = "SINCE")]
    pub since: NaiveDate,

    /// Last day of the report, `YYYY-MM-DD`, taken at midnight.
    #[clap(long, env = "UNTIL")]
    pub until: NaiveDate,

    #[clap(long, env = "SUMMATION", default_value = "rounded")]
    pub summation: Summation,

    /// Directory for the timestamped report documents.
    #[clap(long, env = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[clap(flatten)]
    pub export: ExportPathArgs,
}

#[derive(Parser)]
pub struct ExportArgs {
    #[clap(flatten)]
    pub source: SourceArgs,

    #[clap(flatten)]
    pub export: ExportPathArgs,
}

#[derive(Parser)]
pub struct ExportPathArgs {
    /// CSV file with all sessions and their prices.
    #[clap(long = "export-path", env = "EXPORT_PATH", default_value = "sessions_with_prices.csv")]
    pub path: PathBuf,
}
