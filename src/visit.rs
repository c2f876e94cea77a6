use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Instant;
use tracing::info;

use crate::error::QueryError;
use crate::filter::{filter_visits, VisitFilter};

/// How the browser arrived at a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Link,
    Typed,
    AutoBookmark,
    AutoSubframe,
    ManualSubframe,
    Generated,
    StartPage,
    FormSubmit,
    Reload,
    Keyword,
    KeywordGenerated,
}

impl Transition {
    pub const ALL: [Transition; 11] = [
        Transition::Link,
        Transition::Typed,
        Transition::AutoBookmark,
        Transition::AutoSubframe,
        Transition::ManualSubframe,
        Transition::Generated,
        Transition::StartPage,
        Transition::FormSubmit,
        Transition::Reload,
        Transition::Keyword,
        Transition::KeywordGenerated,
    ];

    /// Maps a Chromium `visits.transition` value onto the closed set.
    ///
    /// Only the core type in the low byte is used; qualifier bits are ignored.
    /// Chromium's `auto_toplevel` is reported as `StartPage`.
    pub fn from_chrome_code(code: i64) -> Option<Transition> {
        match code & 0xFF {
            0 => Some(Transition::Link),
            1 => Some(Transition::Typed),
            2 => Some(Transition::AutoBookmark),
            3 => Some(Transition::AutoSubframe),
            4 => Some(Transition::ManualSubframe),
            5 => Some(Transition::Generated),
            6 => Some(Transition::StartPage),
            7 => Some(Transition::FormSubmit),
            8 => Some(Transition::Reload),
            9 => Some(Transition::Keyword),
            10 => Some(Transition::KeywordGenerated),
            _ => None,
        }
    }
}

/// One recorded navigation to a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    /// The visit this one was reached from, if any.
    #[serde(default)]
    pub ref_id: Option<String>,
    pub transition: Transition,
}

/// Read-only handle over an ordered snapshot of visits.
///
/// Callers build one per data load and pass it to every query; nothing in the
/// crate mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct VisitStore {
    visits: Vec<Visit>,
}

impl VisitStore {
    pub fn new(visits: Vec<Visit>) -> Self {
        Self { visits }
    }

    /// Decodes a JSON array of visit objects.
    pub fn from_json_str(json: &str) -> Result<Self, QueryError> {
        let visits: Vec<Visit> = serde_json::from_str(json)?;
        Ok(Self::new(visits))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, QueryError> {
        let start_time = Instant::now();
        let visits: Vec<Visit> = serde_json::from_reader(reader)?;
        info!(
            action = "load",
            component = "json_source",
            visit_count = visits.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Decoded visits from JSON"
        );
        Ok(Self::new(visits))
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Returns the visits matching `filter`, in storage order.
    pub fn get_visits(&self, filter: &VisitFilter) -> Vec<&Visit> {
        filter_visits(&self.visits, filter)
    }

    /// Earliest and latest visit time, or `None` for an empty store.
    pub fn time_span(&self) -> Option<(i64, i64)> {
        time_span(&self.visits)
    }
}

impl From<Vec<Visit>> for VisitStore {
    fn from(visits: Vec<Visit>) -> Self {
        Self::new(visits)
    }
}

pub fn time_span<'a, I>(visits: I) -> Option<(i64, i64)>
where
    I: IntoIterator<Item = &'a Visit>,
{
    visits.into_iter().fold(None, |span, visit| match span {
        None => Some((visit.time, visit.time)),
        Some((earliest, latest)) => Some((earliest.min(visit.time), latest.max(visit.time))),
    })
}
