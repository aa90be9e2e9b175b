use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::dates::days_between;
use crate::duration::inclusive_day_count;
use crate::error::Result;
use crate::priority::{Priority, TaskLike};
use crate::urgency::{classify, Urgency, DEFAULT_WARNING_DAYS};

/// Where a task stands. Unrecognised labels read as `Todo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Todo,
    Progress,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::Progress => write!(f, "progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "progress" | "in-progress" | "in_progress" => Self::Progress,
            "done" => Self::Done,
            _ => Self::Todo,
        }
    }
}

impl From<TaskStatus> for String {
    fn from(s: TaskStatus) -> Self {
        s.to_string()
    }
}

/// Represents a single lab task.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: u64,
    /// Short description of the work.
    pub name: String,
    /// Research project the task belongs to, if any.
    #[serde(default)]
    pub project: Option<String>,
    /// Area of work: research, teaching, grants, grad-mentorship,
    /// undergrad-mentorship, admin or misc.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Due day, if the task has a deadline.
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Timestamp when the task was created (RFC 3339).
    pub created_at: String,
    /// Timestamp when the task was marked done (RFC 3339).
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Task {
    /// Days until the due date; negative when overdue.
    pub fn days_left(&self, clock: &impl Clock) -> Option<i64> {
        self.due.map(|d| days_between(clock.today(), d))
    }

    /// Open and due today or earlier.
    pub fn is_pressing(&self, clock: &impl Clock) -> bool {
        !self.is_done() && self.days_left(clock).is_some_and(|d| d <= 0)
    }
}

impl TaskLike for Task {
    fn priority(&self) -> Priority {
        self.priority
    }

    fn due(&self) -> Option<NaiveDate> {
        self.due
    }

    fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// A research permit (IRB, IACUC, collection licence, ...) that lapses.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Permit {
    pub id: u64,
    pub title: String,
    /// Permit type, e.g. "IRB" or "collection".
    #[serde(default)]
    pub kind: Option<String>,
    /// Number issued by the granting authority.
    #[serde(default)]
    pub permit_number: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Custom renewal warning window in days. Falls back to
    /// [`DEFAULT_WARNING_DAYS`].
    #[serde(default)]
    pub renewal_reminder_days: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Permit {
    pub fn warning_days(&self) -> i64 {
        self.renewal_reminder_days.unwrap_or(DEFAULT_WARNING_DAYS)
    }

    pub fn days_until_expiry(&self, clock: &impl Clock) -> Option<i64> {
        self.expiration_date.map(|d| days_between(clock.today(), d))
    }

    /// Expiry urgency under this permit's own reminder window.
    pub fn urgency(&self, clock: &impl Clock) -> Option<Urgency> {
        self.days_until_expiry(clock)
            .map(|days| classify(days, self.warning_days()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldworkStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for FieldworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for FieldworkStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!(
                "unknown fieldwork status '{other}' (planned, active, completed, cancelled)"
            )),
        }
    }
}

/// A scheduled trip to a field site.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Fieldwork {
    pub id: u64,
    pub title: String,
    /// Field site name or location.
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: FieldworkStatus,
}

impl Fieldwork {
    /// Trip length in days, both ends included.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReversedRange`] if the stored range is backwards.
    pub fn duration_days(&self) -> Result<Option<i64>> {
        inclusive_day_count(self.start_date, self.end_date)
    }

    pub fn days_until_start(&self, clock: &impl Clock) -> Option<i64> {
        self.start_date.map(|d| days_between(clock.today(), d))
    }

    /// Starts between today and `days_ahead` days out. Finished and
    /// cancelled trips are never upcoming.
    pub fn is_upcoming(&self, days_ahead: i64, clock: &impl Clock) -> bool {
        matches!(self.status, FieldworkStatus::Planned | FieldworkStatus::Active)
            && matches!(self.days_until_start(clock), Some(d) if (0..=days_ahead).contains(&d))
    }
}
