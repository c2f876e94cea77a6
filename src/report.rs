use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::time::Instant;
use tracing::info;

use crate::args::{Grouping, OutputFormat};
use crate::filter::VisitFilter;
use crate::stats::{self, Entry, SortBy};
use crate::utils::{format_number, redact_domain};
use crate::visit::{self, VisitStore};
use crate::{sqlite, Args};

/// Rows of a finished query, keyed the way they were grouped.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Rows {
    Domains(Vec<Entry<String>>),
    Buckets(Vec<Entry<i32>>),
}

impl Rows {
    pub fn len(&self) -> usize {
        match self {
            Rows::Domains(rows) => rows.len(),
            Rows::Buckets(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reverse(&mut self) {
        match self {
            Rows::Domains(rows) => rows.reverse(),
            Rows::Buckets(rows) => rows.reverse(),
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            Rows::Domains(rows) => rows.truncate(len),
            Rows::Buckets(rows) => rows.truncate(len),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub source: String,
    pub grouping: String,
    pub total_visits: usize,
    pub matched_visits: usize,
    /// Earliest and latest matched visit, epoch milliseconds.
    pub time_span: Option<(i64, i64)>,
    pub rows: Rows,
}

/// Loads visits from the source selected on the command line.
pub fn load_store(args: &Args) -> Result<(String, VisitStore)> {
    if let Some(path) = &args.json {
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let store = VisitStore::from_json_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read visits from {:?}", path))?;
        return Ok((path.display().to_string(), store));
    }

    let history_path = match &args.history {
        Some(path) => path.clone(),
        None => sqlite::get_browser_history_path(&args.browser)?,
    };
    let store = sqlite::load_history_file(&history_path, args.temp_path.as_deref())?;
    let source = match &args.history {
        Some(path) => path.display().to_string(),
        None => args.browser.clone(),
    };
    Ok((source, store))
}

pub fn filter_from_args(args: &Args) -> VisitFilter {
    VisitFilter {
        min_time: args.min_time,
        max_time: args.max_time,
        domain: args.domain.clone(),
        ..VisitFilter::default()
    }
}

/// Filters, aggregates and orders `store` as requested by `args`.
pub fn build_report(source: String, store: &VisitStore, args: &Args) -> Result<QueryReport> {
    let start_time = Instant::now();

    let matched = store.get_visits(&filter_from_args(args));
    let sort_by = SortBy::from(args.sort_by_value);

    let mut rows = match args.group_by {
        Grouping::Domain => {
            let mut counts = stats::count_by_domain(matched.iter().copied());
            if args.redact {
                counts = redact_counts(counts);
            }
            Rows::Domains(stats::to_sorted_entries(&counts, sort_by))
        }
        Grouping::Time(scale) => {
            let counts = if args.local_time {
                stats::count_by_time_scale_in(matched.iter().copied(), scale, &Local)?
            } else {
                stats::count_by_time_scale(matched.iter().copied(), scale)?
            };
            Rows::Buckets(stats::to_sorted_entries(&counts, sort_by))
        }
    };

    if args.reverse {
        rows.reverse();
    }
    if let Some(top) = args.top {
        rows.truncate(top);
    }

    info!(
        action = "complete",
        component = "query",
        grouping = %args.group_by,
        matched_visits = matched.len(),
        rows = rows.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Query completed"
    );

    Ok(QueryReport {
        source,
        grouping: args.group_by.to_string(),
        total_visits: store.len(),
        matched_visits: matched.len(),
        time_span: visit::time_span(matched.iter().copied()),
        rows,
    })
}

/// Re-keys a domain tally by redacted name, merging domains that mask alike.
fn redact_counts(counts: HashMap<String, u32>) -> HashMap<String, u32> {
    let mut redacted: HashMap<String, u32> = HashMap::with_capacity(counts.len());
    for (domain, count) in counts {
        *redacted.entry(redact_domain(&domain)).or_insert(0) += count;
    }
    redacted
}

pub fn run(args: &Args) -> Result<QueryReport> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "query", "Starting visit query");

    let (source, store) = load_store(args)?;
    let report = build_report(source, &store, args)?;

    info!(
        action = "complete",
        component = "run",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Run completed successfully"
    );
    Ok(report)
}

/// Whole days between two epoch-millisecond times; saturates on extreme input.
fn days_between(earliest: i64, latest: i64) -> u64 {
    (latest.saturating_sub(earliest) / 86_400_000).unsigned_abs()
}

fn format_time(time: i64, local: bool) -> String {
    const DATE_FORMAT: &str = "%B %-d, %Y";
    match DateTime::<Utc>::from_timestamp_millis(time) {
        Some(utc) if local => utc.with_timezone(&Local).format(DATE_FORMAT).to_string(),
        Some(utc) => utc.format(DATE_FORMAT).to_string(),
        None => time.to_string(),
    }
}

pub fn print_report(report: &QueryReport, args: &Args) -> Result<()> {
    if args.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(report).context("Failed to encode report")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n--- {} Visits by {} ---", report.source, report.grouping);

    match report.time_span {
        Some((earliest, latest)) => {
            println!(
                "Date range: {} to {} ({} days)",
                format_time(earliest, args.local_time),
                format_time(latest, args.local_time),
                format_number(days_between(earliest, latest))
            );
        }
        None => println!("Date range: No data available"),
    }

    println!(
        "Visits matched: {} of {}",
        format_number(report.matched_visits as u64),
        format_number(report.total_visits as u64)
    );
    println!();

    match &report.rows {
        Rows::Domains(rows) => {
            for row in rows {
                let domain = if row.key.is_empty() {
                    "(no host)"
                } else {
                    row.key.as_str()
                };
                println!("- {}: {} visits", domain, format_number(u64::from(row.val)));
            }
        }
        Rows::Buckets(rows) => {
            for row in rows {
                println!("- {}: {} visits", row.key, format_number(u64::from(row.val)));
            }
        }
    }

    Ok(())
}
