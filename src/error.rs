use std::time::Duration;
use thiserror::Error;

/// Failures that abort a refresh. The worker keeps its last good snapshot.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("could not resolve {0}")]
    Resolution(String),

    #[error("source payload is missing {0}")]
    SourceFormat(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("refresh timed out after {0:?}")]
    Timeout(Duration),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// A single record that could not be read. Logged and skipped, never fatal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("record is missing '{0}'")]
    MissingField(&'static str),

    #[error("'{0}' is not an hour of the day")]
    InvalidHour(String),

    #[error("record ends at or before its start: {0}")]
    EmptyInterval(String),

    #[error("record is not an object: {0}")]
    NotAnObject(String),
}
