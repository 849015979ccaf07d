//! Timestamp utilities
//!
//! Submission timestamps are stored as fixed-width RFC 3339 text
//! (`YYYY-MM-DDTHH:MM:SS.ffffffZ`) so lexical order in SQL matches
//! chronological order.

use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::{Error, Result};

const DB_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Current UTC timestamp at the precision the database keeps (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp for storage
pub fn to_db(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DB_FORMAT).to_string()
}

/// Parse a stored timestamp
pub fn from_db(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}

/// Instant `days` days before now
pub fn cutoff_days(days: u32) -> DateTime<Utc> {
    now() - Duration::days(i64::from(days))
}
