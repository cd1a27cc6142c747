use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

use super::parser::ParseError;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Inclusive calendar-date range selecting which records are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateWindow {
    /// Returns `None` when `first` falls after `last`
    pub fn new(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    /// Whether the date part of an ISO-8601 time field lies inside the window
    pub fn contains(&self, time: &str) -> Result<bool, ParseError> {
        let date = parse_date(time)?;
        Ok(self.first <= date && date <= self.last)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.first, self.last)
    }
}

/// Extract the calendar date from an ISO-8601 date or date-time
///
/// Offsets are honoured as written; the date is the one local to the offset.
pub fn parse_date(time: &str) -> Result<NaiveDate, ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Ok(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(time, format) {
            return Ok(dt.date());
        }
    }

    NaiveDate::parse_from_str(time, "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidTimestamp(time.to_string()))
}
