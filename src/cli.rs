use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "statfetch")]
#[command(about = "Rate-limited, resumable API-Football downloader", long_about = None)]
pub struct Cli {
    /// Configuration file (overrides STATFETCH_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the schedule for a date and every fixture it expands to
    Run(DownloadArgs),
    /// Finish pending work for the namespace, then download the date
    Ongoing(DownloadArgs),
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Date in YYYY-MM-DD format
    pub date: NaiveDate,

    /// Name identifying this download process; each namespace has its own
    /// backlog and daily budget
    pub namespace: String,
}
