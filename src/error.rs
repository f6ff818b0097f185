//! Error taxonomy for a single poll cycle.
//!
//! Errors fall in two groups. *Classified* failures (transport problems,
//! bad HTTP status, extraction misses) feed the failure counter and the
//! back-off. Everything else is *unexpected*: it is logged and the loop
//! pauses one base interval without touching the counter.

use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// Anything that can go wrong while fetching, extracting or persisting a rate.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request could not complete (connect error, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than `200 OK`.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// The page was fetched but no selector yielded a parseable rate.
    #[error("no selector yielded a parseable rate")]
    NotFound,

    /// Appending to the record failed.
    #[error("failed to write record: {0}")]
    Persistence(#[from] std::io::Error),

    /// A generated header value was rejected by the HTTP stack.
    #[error("invalid request header: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// Catch-all, also used for panics caught inside a cycle.
    #[error("{0}")]
    Unexpected(String),
}

impl ScrapeError {
    /// Whether this error counts towards the consecutive failure counter.
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport(_) | ScrapeError::Status(_) | ScrapeError::NotFound
        )
    }
}
