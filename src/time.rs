//! Timestamp handling for persisted models.
//!
//! Timestamps are kept as `DateTime<Utc>` with microsecond precision and
//! written to disk as ISO-8601 strings without an offset, e.g.
//! `2017-09-28T21:05:54.119427`.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::ModelError;

/// Layout used when writing timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Layout accepted when reading timestamps (any fractional precision).
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Returns the current time truncated to microseconds.
///
/// Truncation keeps `parse(format(now())) == now()`.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Renders a timestamp in the on-disk layout.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2017, 9, 28, 21, 5, 54).unwrap();
/// assert_eq!(hbnb::time::format(&ts), "2017-09-28T21:05:54.000000");
/// ```
#[must_use]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Offset-free strings are read as UTC. RFC 3339 strings carrying an
/// offset are accepted as well and converted to UTC.
///
/// # Errors
///
/// Returns `ModelError::InvalidTimestamp` naming `field` when the value
/// matches neither layout.
pub fn parse(field: &str, value: &str) -> Result<DateTime<Utc>, ModelError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, PARSE_FORMAT) {
        return Ok(naive.and_utc().trunc_subsecs(6));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc).trunc_subsecs(6))
        .map_err(|e| ModelError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
