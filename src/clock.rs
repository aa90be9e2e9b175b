use chrono::{Local, NaiveDate};

/// Source of "today" for every date-relative calculation.
///
/// Urgency and upcoming checks change across midnight, so callers pass a
/// clock instead of the functions reading the system time themselves.
pub trait Clock {
    /// The current calendar day in local time.
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
