use crate::dates::{days_between, resolve, ToDay};
use crate::error::{Error, Result};

/// Number of calendar days a range touches, counting both ends.
///
/// A one-day trip starting and ending on the same day is 1.
///
/// # Returns
/// - `Ok(None)` if either end is missing.
///
/// # Errors
/// - [`Error::ReversedRange`] if `end` falls before `start`.
/// - [`Error::InvalidDate`] for unparseable strings.
pub fn inclusive_day_count<S: ToDay, E: ToDay>(start: Option<S>, end: Option<E>) -> Result<Option<i64>> {
    let (start, end) = match (resolve(start)?, resolve(end)?) {
        (Some(s), Some(e)) => (s, e),
        _ => return Ok(None),
    };
    if end < start {
        return Err(Error::ReversedRange { start, end });
    }
    Ok(Some(days_between(start, end) + 1))
}
