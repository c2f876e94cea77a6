use thiserror::Error;

/// Errors raised by the query core.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A time scale selector that is not one of hour/day/month/year.
    #[error("invalid time scale '{0}': expected hour, day, month, year or 1-4")]
    InvalidTimeScale(String),

    /// A visit timestamp that cannot be placed on the calendar.
    #[error("visit {visit_id} has a timestamp out of range: {time}")]
    TimestampOutOfRange { visit_id: String, time: i64 },

    #[error("failed to decode visits: {0}")]
    Json(#[from] serde_json::Error),
}
