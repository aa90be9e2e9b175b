//! Turning caller-supplied dates into calendar days.
//!
//! Everything downstream works on [`NaiveDate`] in local time. Timestamps
//! with an offset are moved into the local zone first and then truncated,
//! so the time of day never shifts a day count.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{Error, Result};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Naive timestamps are read as local wall time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Anything that names a calendar day.
pub trait ToDay {
    /// Resolves to the local calendar day, failing only on unparseable text.
    fn to_day(&self) -> Result<NaiveDate>;
}

impl ToDay for NaiveDate {
    fn to_day(&self) -> Result<NaiveDate> {
        Ok(*self)
    }
}

impl ToDay for NaiveDateTime {
    fn to_day(&self) -> Result<NaiveDate> {
        Ok(self.date())
    }
}

impl<Tz: TimeZone> ToDay for DateTime<Tz> {
    fn to_day(&self) -> Result<NaiveDate> {
        Ok(self.with_timezone(&Local).date_naive())
    }
}

impl ToDay for str {
    fn to_day(&self) -> Result<NaiveDate> {
        parse_day(self)
    }
}

impl ToDay for String {
    fn to_day(&self) -> Result<NaiveDate> {
        parse_day(self)
    }
}

impl<T: ToDay + ?Sized> ToDay for &T {
    fn to_day(&self) -> Result<NaiveDate> {
        (**self).to_day()
    }
}

/// Parses `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive ISO-8601
/// date-time into a local calendar day.
///
/// # Errors
/// Returns [`Error::InvalidDate`] when no accepted shape matches.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    let s = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
        return Ok(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Local).date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ts| ts.date())
        .ok_or_else(|| Error::InvalidDate {
            input: input.to_string(),
        })
}

/// Like [`parse_day`], but a missing or blank input means "no date".
///
/// # Errors
/// Returns [`Error::InvalidDate`] for non-blank input that does not parse.
pub fn parse_optional_day(input: Option<&str>) -> Result<Option<NaiveDate>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_day(s).map(Some),
    }
}

/// Resolves an optional date input, propagating parse failures.
pub(crate) fn resolve<D: ToDay>(date: Option<D>) -> Result<Option<NaiveDate>> {
    date.map(|d| d.to_day()).transpose()
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
