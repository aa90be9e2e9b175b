use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::dates::{days_between, resolve, ToDay};
use crate::error::Result;

/// Anything due within this many days is critical, whatever the caller's
/// warning window.
pub const CRITICAL_WINDOW_DAYS: i64 = 14;

/// Warning window used when a record has no reminder setting of its own.
pub const DEFAULT_WARNING_DAYS: i64 = 60;

/// Look-ahead for [`is_upcoming`] when the caller has no preference.
pub const DEFAULT_UPCOMING_DAYS: i64 = 30;

/// How soon a dated obligation needs attention.
///
/// Ordered from most to least pressing: `Expired < Critical < Warning < Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Expired,
    Critical,
    Warning,
    Ok,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::Critical => write!(f, "critical"),
            Self::Warning => write!(f, "warning"),
            Self::Ok => write!(f, "ok"),
        }
    }
}

/// Signed calendar days from today until `date`.
///
/// Positive is the future, zero is today, negative is the past. Both ends
/// are whole days, so a timestamp later today still counts as 0.
///
/// # Returns
/// - `Ok(None)` if no date is given.
///
/// # Errors
/// Propagates [`crate::Error::InvalidDate`] for unparseable strings.
pub fn days_until<D: ToDay>(date: Option<D>, clock: &impl Clock) -> Result<Option<i64>> {
    Ok(resolve(date)?.map(|day| days_between(clock.today(), day)))
}

/// Calendar days elapsed since `date`; the negation of [`days_until`].
///
/// # Errors
/// Propagates [`crate::Error::InvalidDate`] for unparseable strings.
pub fn days_since<D: ToDay>(date: Option<D>, clock: &impl Clock) -> Result<Option<i64>> {
    Ok(days_until(date, clock)?.map(|d| -d))
}

/// Classifies a day count against the fixed critical window and the
/// caller's warning window.
pub fn classify(days_until: i64, warning_days: i64) -> Urgency {
    if days_until < 0 {
        Urgency::Expired
    } else if days_until <= CRITICAL_WINDOW_DAYS {
        Urgency::Critical
    } else if days_until <= warning_days {
        Urgency::Warning
    } else {
        Urgency::Ok
    }
}

/// Urgency of a dated obligation such as a permit expiry.
///
/// `warning_days` is usually [`DEFAULT_WARNING_DAYS`] or a per-record
/// reminder window. It never widens or narrows the critical window.
///
/// # Errors
/// Propagates [`crate::Error::InvalidDate`] for unparseable strings.
pub fn get_urgency<D: ToDay>(
    date: Option<D>,
    warning_days: i64,
    clock: &impl Clock,
) -> Result<Option<Urgency>> {
    Ok(days_until(date, clock)?.map(|days| classify(days, warning_days)))
}

/// Whether `date` falls between today and `days_ahead` days out, inclusive.
///
/// Missing and past dates are never upcoming.
///
/// # Errors
/// Propagates [`crate::Error::InvalidDate`] for unparseable strings.
pub fn is_upcoming<D: ToDay>(date: Option<D>, days_ahead: i64, clock: &impl Clock) -> Result<bool> {
    Ok(matches!(days_until(date, clock)?, Some(days) if (0..=days_ahead).contains(&days)))
}
