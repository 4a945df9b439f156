//! Timestamp helpers for artifact directory naming.

use chrono::{DateTime, Utc};

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Format used for artifact directory names, e.g. `20240101000000`.
///
/// Names in this format sort lexicographically and numerically in the same
/// order, which the prediction service relies on to find the newest model.
pub const TIME_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Returns the current UTC time formatted for artifact directory names.
///
/// # Examples
///
/// ```
/// use housing::utils::current_time_stamp;
///
/// let ts = current_time_stamp();
/// assert_eq!(ts.len(), 14);
/// ```
#[must_use]
pub fn current_time_stamp() -> String {
    format_time_stamp(&Utc::now())
}

/// Formats a timestamp for artifact directory names.
#[must_use]
pub fn format_time_stamp(at: &Timestamp) -> String {
    at.format(TIME_STAMP_FORMAT).to_string()
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Returns the elapsed seconds between two instants, clamped at zero.
#[must_use]
pub fn elapsed_seconds(start: &Timestamp, end: &Timestamp) -> f64 {
    let millis = (*end - *start).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
