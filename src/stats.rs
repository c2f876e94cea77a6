use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::str::FromStr;
use std::time::Instant;
use tracing::info;

use crate::error::QueryError;
use crate::host::extract_host;
use crate::visit::Visit;

/// Calendar granularity used to bucket visit times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScale {
    /// Hour of day, 0-23.
    Hour,
    /// Day of month, 1-31.
    Day,
    /// Month of year, 0-11.
    Month,
    /// Calendar year.
    Year,
}

impl TimeScale {
    pub fn name(self) -> &'static str {
        match self {
            TimeScale::Hour => "hour",
            TimeScale::Day => "day",
            TimeScale::Month => "month",
            TimeScale::Year => "year",
        }
    }

    /// The calendar component of `time` (epoch milliseconds) in zone `tz`.
    pub fn bucket_in<Tz: TimeZone>(self, time: i64, tz: &Tz) -> Option<i32> {
        let local = DateTime::<Utc>::from_timestamp_millis(time)?.with_timezone(tz);
        let bucket = match self {
            TimeScale::Hour => local.hour() as i32,
            TimeScale::Day => local.day() as i32,
            TimeScale::Month => local.month0() as i32,
            TimeScale::Year => local.year(),
        };
        Some(bucket)
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for TimeScale {
    type Error = QueryError;

    /// Accepts the legacy selector codes 1 (hour) to 4 (year).
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TimeScale::Hour),
            2 => Ok(TimeScale::Day),
            3 => Ok(TimeScale::Month),
            4 => Ok(TimeScale::Year),
            other => Err(QueryError::InvalidTimeScale(other.to_string())),
        }
    }
}

impl FromStr for TimeScale {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "1" => Ok(TimeScale::Hour),
            "day" | "2" => Ok(TimeScale::Day),
            "month" | "3" => Ok(TimeScale::Month),
            "year" | "4" => Ok(TimeScale::Year),
            _ => Err(QueryError::InvalidTimeScale(s.to_string())),
        }
    }
}

/// Tallies visits per time bucket, computed in UTC.
pub fn count_by_time_scale<I>(
    visits: I,
    scale: TimeScale,
) -> Result<HashMap<i32, u32>, QueryError>
where
    I: IntoIterator,
    I::Item: Borrow<Visit>,
{
    count_by_time_scale_in(visits, scale, &Utc)
}

/// Tallies visits per time bucket, computed in `tz`.
///
/// Fails without partial output if any timestamp is outside chrono's range.
pub fn count_by_time_scale_in<I, Tz>(
    visits: I,
    scale: TimeScale,
    tz: &Tz,
) -> Result<HashMap<i32, u32>, QueryError>
where
    I: IntoIterator,
    I::Item: Borrow<Visit>,
    Tz: TimeZone,
{
    let start_time = Instant::now();
    let mut counts: HashMap<i32, u32> = HashMap::new();

    for visit in visits {
        let visit = visit.borrow();
        let bucket = scale.bucket_in(visit.time, tz).ok_or_else(|| {
            QueryError::TimestampOutOfRange {
                visit_id: visit.id.clone(),
                time: visit.time,
            }
        })?;
        *counts.entry(bucket).or_insert(0) += 1;
    }

    info!(
        action = "complete",
        component = "time_aggregation",
        scale = scale.name(),
        buckets = counts.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Counted visits by time"
    );
    Ok(counts)
}

/// Tallies visits per host.
pub fn count_by_domain<I>(visits: I) -> HashMap<String, u32>
where
    I: IntoIterator,
    I::Item: Borrow<Visit>,
{
    let start_time = Instant::now();
    let mut counts: HashMap<String, u32> = HashMap::new();

    for visit in visits {
        let domain = extract_host(&visit.borrow().url);
        *counts.entry(domain).or_insert(0) += 1;
    }

    info!(
        action = "complete",
        component = "domain_aggregation",
        unique_domains = counts.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Counted visits by domain"
    );
    counts
}

/// A single key/count pair of a sorted tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry<K> {
    pub key: K,
    pub val: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Key,
    Value,
}

impl From<bool> for SortBy {
    /// `true` selects value ordering, like the old `sortByValue` flag.
    fn from(sort_by_value: bool) -> Self {
        if sort_by_value {
            SortBy::Value
        } else {
            SortBy::Key
        }
    }
}

/// Flattens a tally into entries in ascending order of `sort_by`.
///
/// Value ties are ordered by key.
pub fn to_sorted_entries<K, S>(counts: &HashMap<K, u32, S>, sort_by: SortBy) -> Vec<Entry<K>>
where
    K: Ord + Hash + Clone,
    S: BuildHasher,
{
    let mut entries: Vec<Entry<K>> = counts
        .iter()
        .map(|(key, &val)| Entry {
            key: key.clone(),
            val,
        })
        .collect();

    match sort_by {
        SortBy::Key => entries.sort_unstable_by(|a, b| a.key.cmp(&b.key)),
        SortBy::Value => {
            entries.sort_unstable_by(|a, b| a.val.cmp(&b.val).then_with(|| a.key.cmp(&b.key)))
        }
    }
    entries
}
