//! Date and timestamp parsing shared by filter coercion and parameter binding

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Accepted naive timestamp layouts; `%.f` also matches a missing fraction
pub const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A request string read as a PostgreSQL date or timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    /// RFC 3339 with an offset, binds as `timestamptz`
    Zoned(DateTime<FixedOffset>),
    /// Bare calendar date, binds as `date`
    Date(NaiveDate),
    /// Timestamp without offset, binds as `timestamp`
    Naive(NaiveDateTime),
}

pub fn parse_temporal(input: &str) -> Option<Temporal> {
    let input = input.trim();
    if let Ok(zoned) = DateTime::parse_from_rfc3339(input) {
        return Some(Temporal::Zoned(zoned));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Some(Temporal::Date(date));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(Temporal::Naive)
}
