//! Priority labels and the urgency ordering used for task lists.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Task priority, `P1` most pressing.
///
/// Stored as `"p1"`..`"p4"`. Labels outside that set read as `P4` so one
/// malformed record cannot break loading or sorting a whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    P1,
    P2,
    #[default]
    P3,
    P4,
}

impl Priority {
    /// 0 for `P1` through 3 for `P4`.
    pub fn rank(self) -> u8 {
        match self {
            Self::P1 => 0,
            Self::P2 => 1,
            Self::P3 => 2,
            Self::P4 => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
            Self::P4 => "p4",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Priority {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "p1" => Self::P1,
            "p2" => Self::P2,
            "p3" => Self::P3,
            _ => Self::P4,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

/// Rank of a raw priority label. Unknown labels rank with `p4`.
pub fn priority_rank(label: &str) -> u8 {
    Priority::from(label).rank()
}

/// The fields the urgency ordering looks at.
pub trait TaskLike {
    fn priority(&self) -> Priority;
    fn due(&self) -> Option<NaiveDate>;
    fn is_done(&self) -> bool;
}

/// Sort key, compared field by field.
type UrgencyKey = (bool, bool, u8, bool, Option<NaiveDate>);

fn urgency_key<T: TaskLike + ?Sized>(task: &T, today: NaiveDate) -> UrgencyKey {
    let done = task.is_done();
    let due = task.due();
    let pressing = !done && due.is_some_and(|d| d <= today);
    (done, !pressing, task.priority().rank(), due.is_none(), due)
}

/// Sort comparator for focus mode. `Less` means `a` goes first.
///
/// Tiers, each overriding the ones below it:
/// 1. Open tasks before done tasks.
/// 2. Open tasks that are overdue or due today before everything else open.
/// 3. Higher priority (`p1` before `p4`).
/// 4. Earlier due date; undated tasks after dated ones.
pub fn compare_by_urgency<T: TaskLike + ?Sized>(a: &T, b: &T, clock: &impl Clock) -> Ordering {
    let today = clock.today();
    urgency_key(a, today).cmp(&urgency_key(b, today))
}

/// Sorts in place by [`compare_by_urgency`]. Stable: ties keep input order.
pub fn sort_by_urgency<T: TaskLike>(tasks: &mut [T], clock: &impl Clock) {
    let today = clock.today();
    tasks.sort_by_key(|t| urgency_key(t, today));
}

/// The `limit` most urgent open tasks.
pub fn focus<'a, T: TaskLike>(tasks: &'a [T], limit: usize, clock: &impl Clock) -> Vec<&'a T> {
    let today = clock.today();
    let mut open: Vec<&T> = tasks.iter().filter(|t| !t.is_done()).collect();
    open.sort_by_key(|t| urgency_key(*t, today));
    open.truncate(limit);
    open
}
