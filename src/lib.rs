//! # labtrack
//!
//! Keeps a research lab's dated obligations in one place: tasks with
//! priorities and due dates, permits that expire, and fieldwork trips.
//!
//! The calculations are plain functions over calendar days:
//!
//! *   [`urgency`]: days until a date, expiry urgency
//!     (`expired` / `critical` / `warning` / `ok`) and the upcoming check.
//! *   [`priority`]: priority labels and the focus-mode ordering of tasks.
//! *   [`duration`]: inclusive day counts for date ranges.
//!
//! Anything relative to "today" takes a [`Clock`], so the same inputs give
//! the same answers in tests.
//!
//! ```
//! use chrono::NaiveDate;
//! use labtrack::{get_urgency, FixedClock, Urgency, DEFAULT_WARNING_DAYS};
//!
//! let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
//! let urgency = get_urgency(Some("2025-06-10"), DEFAULT_WARNING_DAYS, &clock).unwrap();
//! assert_eq!(urgency, Some(Urgency::Critical));
//! ```

pub mod clock;
pub mod commands;
pub mod dates;
pub mod duration;
pub mod error;
pub mod models;
pub mod priority;
pub mod storage;
pub mod tui;
pub mod urgency;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dates::{parse_day, ToDay};
pub use duration::inclusive_day_count;
pub use error::{Error, Result};
pub use priority::{compare_by_urgency, priority_rank, sort_by_urgency, Priority, TaskLike};
pub use urgency::{
    days_since, days_until, get_urgency, is_upcoming, Urgency, CRITICAL_WINDOW_DAYS,
    DEFAULT_UPCOMING_DAYS, DEFAULT_WARNING_DAYS,
};
