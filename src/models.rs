//! Data model for persisted exchange-rate readings.
//!
//! A [`RateReading`] is created once per successful poll, handed to the
//! record writer, and never touched again.

use chrono::{DateTime, Local};
use std::fmt;

/// Label written in the `Source` column for rates scraped from the quote page.
pub const WEBPAGE_SOURCE: &str = "Webpage";

/// Format used for the `Timestamp` column (local time, microsecond precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One observed exchange rate.
///
/// # Fields
///
/// * `timestamp` - Local instant at which the rate was extracted
/// * `value` - The rate itself, always finite and strictly positive
/// * `source` - Free-text label of where the value came from
#[derive(Debug, Clone, PartialEq)]
pub struct RateReading {
    timestamp: DateTime<Local>,
    value: f64,
    source: String,
}

impl RateReading {
    /// Create a reading stamped with the current local time.
    pub fn now(value: f64, source: impl Into<String>) -> Self {
        Self::at(Local::now(), value, source)
    }

    /// Create a reading with an explicit timestamp.
    pub fn at(timestamp: DateTime<Local>, value: f64, source: impl Into<String>) -> Self {
        Self {
            timestamp,
            value,
            source: source.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// ISO-8601 rendering of the timestamp, as stored in the record.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp().format(TIMESTAMP_FORMAT).to_string()
    }

    /// The reading as a `(timestamp, rate, source)` row.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp_iso(),
            self.value.to_string(),
            self.source.clone(),
        ]
    }
}

impl fmt::Display for RateReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - USD/RUB: {}",
            self.timestamp().format("%Y-%m-%d %H:%M:%S"),
            self.value
        )
    }
}
