use std::path::PathBuf;

use chrono::NaiveDate;

/// Errors produced by the labtrack library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A non-empty date string that is not a day or ISO-8601 timestamp.
    #[error("invalid date '{input}': use YYYY-MM-DD or an ISO-8601 timestamp")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// A date range whose end falls before its start.
    #[error("date range ends ({end}) before it starts ({start})")]
    ReversedRange {
        /// First day of the range.
        start: NaiveDate,
        /// Last day of the range.
        end: NaiveDate,
    },

    /// Reading or writing a data file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file holds malformed JSON.
    #[error("malformed data in {}: {source}", path.display())]
    Json {
        /// File being decoded.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No record with the given id.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind, e.g. "task".
        kind: &'static str,
        /// The missing id.
        id: u64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
