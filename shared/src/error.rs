use thiserror::Error;

/// Failure of a whole feed payload.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed envelope is not valid JSON: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("feed has no update timestamp")]
    MissingTimestamp,
}

/// Reason a single feed row was dropped.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("row shape does not match: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("session time {0:?} is not a start-end range")]
    TimeRange(String),
}
