//! Rate sources and the extraction logic shared between them.
//!
//! # Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`investing`] | HTTP fetch of the investing.com USD/RUB quote page |
//! | [`extract`] | Selector fallback chain turning page markup into a rate |
//! | [`user_agent`] | Random desktop user agents for each request |
//!
//! A source only fetches markup. Extraction happens in the poll loop so that
//! fetch failures and extraction misses can be told apart in the logs.

use crate::error::ScrapeError;

pub mod extract;
pub mod investing;
pub mod user_agent;

/// Something that can produce the raw markup of a quote page.
pub trait RateSource {
    /// Label stored in the `Source` column of every reading from this source.
    fn label(&self) -> &str;

    /// Fetch the page body.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Transport`] or [`ScrapeError::Status`] when the page
    /// could not be retrieved; any other variant is treated as unexpected.
    async fn fetch(&self) -> Result<String, ScrapeError>;
}
