use std::time::Instant;
use tracing::info;

use crate::host::extract_host;
use crate::visit::Visit;

/// Optional constraints for [`filter_visits`]. Every set field must match.
///
/// A bound of exactly `0` and an empty `domain` count as unset, matching how
/// browser-side callers have always passed "no constraint". `domain` is
/// compared case-insensitively since extracted hosts are lower-cased.
///
/// `url`, `category` and `visit_id` are accepted but not evaluated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    /// Inclusive lower bound on `Visit::time`.
    pub min_time: Option<i64>,
    /// Inclusive upper bound on `Visit::time`.
    pub max_time: Option<i64>,
    /// Exact host match.
    pub domain: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub visit_id: Option<String>,
}

impl VisitFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_time(mut self, min_time: i64) -> Self {
        self.min_time = Some(min_time);
        self
    }

    pub fn with_max_time(mut self, max_time: i64) -> Self {
        self.max_time = Some(max_time);
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// The lower bound that is actually applied.
    pub fn active_min_time(&self) -> Option<i64> {
        self.min_time.filter(|&t| t != 0)
    }

    /// The upper bound that is actually applied.
    pub fn active_max_time(&self) -> Option<i64> {
        self.max_time.filter(|&t| t != 0)
    }

    fn active_domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }

    /// True when no evaluated constraint is active.
    pub fn is_unconstrained(&self) -> bool {
        self.active_min_time().is_none()
            && self.active_max_time().is_none()
            && self.active_domain().is_none()
    }

    /// Whether `visit` passes every active constraint.
    pub fn matches(&self, visit: &Visit) -> bool {
        if let Some(domain) = self.active_domain() {
            if !extract_host(&visit.url).eq_ignore_ascii_case(domain) {
                return false;
            }
        }
        if let Some(min_time) = self.active_min_time() {
            if visit.time < min_time {
                return false;
            }
        }
        if let Some(max_time) = self.active_max_time() {
            if visit.time > max_time {
                return false;
            }
        }
        true
    }
}

/// Returns the visits matching `filter`, preserving their relative order.
pub fn filter_visits<'a>(visits: &'a [Visit], filter: &VisitFilter) -> Vec<&'a Visit> {
    let start_time = Instant::now();

    let matched: Vec<&Visit> = visits.iter().filter(|visit| filter.matches(visit)).collect();

    info!(
        action = "complete",
        component = "visit_filter",
        scanned = visits.len(),
        matched = matched.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Filtered visits"
    );
    matched
}
