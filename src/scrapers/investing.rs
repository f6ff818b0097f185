//! investing.com quote page scraper.
//!
//! The page is fetched with a long-lived `reqwest` client so that cookies set
//! by the site survive between polls, and every request carries a fresh
//! random user agent plus the same browser-like `Sec-Fetch-*` headers.

use super::RateSource;
use super::user_agent::gen_random_ua;
use crate::error::ScrapeError;
use crate::models::WEBPAGE_SOURCE;
use crate::utils::truncate_for_log;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Default quote page.
pub const DEFAULT_URL: &str = "https://www.investing.com/currencies/usd-rub";

/// Upper bound on a single fetch, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the USD/RUB quote page.
#[derive(Debug, Clone)]
pub struct InvestingSource {
    client: Client,
    url: Url,
}

impl InvestingSource {
    /// Build a source for `url` with its own cookie-keeping client.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Transport`] if the TLS backend cannot be set up.
    pub fn new(url: Url) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Header set sent with every request. The user agent changes per call.
    pub fn request_headers(&self) -> Result<HeaderMap, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&gen_random_ua())?);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::REFERER, HeaderValue::from_str(self.url.as_str())?);
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("empty"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("cors"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-origin"),
        );
        Ok(headers)
    }
}

impl RateSource for InvestingSource {
    fn label(&self) -> &str {
        WEBPAGE_SOURCE
    }

    #[instrument(level = "debug", skip_all, fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(self.url.clone())
            .headers(self.request_headers()?)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body_preview = %truncate_for_log(&body, 200),
                "Quote page returned non-200 status"
            );
            return Err(ScrapeError::Status(status));
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched quote page"
        );
        Ok(body)
    }
}
