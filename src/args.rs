use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::QueryError;
use crate::stats::TimeScale;

#[derive(Parser, Debug)]
#[command(
    name = "visitstats",
    about = "Filter browser visits and count them by domain or by time",
    version,
    long_about = None
)]
pub struct Args {
    /// Browser profile to read
    #[arg(short, long, default_value = "Vivaldi")]
    pub browser: String,

    /// Read this History database instead of the browser's default profile
    #[arg(long, conflicts_with = "json")]
    pub history: Option<PathBuf>,

    /// Read visits from a JSON array instead of a History database
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Custom temporary file path for database copy
    #[arg(long)]
    pub temp_path: Option<PathBuf>,

    /// Only count visits to this exact host
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Only count visits at or after this time (epoch milliseconds)
    #[arg(long)]
    pub min_time: Option<i64>,

    /// Only count visits at or before this time (epoch milliseconds)
    #[arg(long)]
    pub max_time: Option<i64>,

    /// Group by domain, or by hour, day, month or year
    #[arg(short, long, default_value = "domain")]
    pub group_by: Grouping,

    /// Order rows by visit count instead of by key
    #[arg(long)]
    pub sort_by_value: bool,

    /// Reverse the row order
    #[arg(long)]
    pub reverse: bool,

    /// Number of rows to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Bucket times in the local time zone instead of UTC
    #[arg(long)]
    pub local_time: bool,

    /// Redact domain names for privacy
    #[arg(long)]
    pub redact: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the visits are counted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Domain,
    Time(TimeScale),
}

impl FromStr for Grouping {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("domain") {
            return Ok(Grouping::Domain);
        }
        s.parse().map(Grouping::Time)
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::Domain => f.write_str("domain"),
            Grouping::Time(scale) => scale.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
