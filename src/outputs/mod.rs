//! Persistent record of rate readings.
//!
//! # Submodules
//!
//! - [`csv`]: Append-only CSV file with a `Timestamp,USD/RUB Rate,Source` header
//!
//! # Output Structure
//!
//! ```text
//! Timestamp,USD/RUB Rate,Source
//! 2025-05-06T14:30:00.123456,91.23,Webpage
//! 2025-05-06T14:31:00.456789,91.25,Webpage
//! ```

use crate::error::ScrapeError;
use crate::models::RateReading;

pub mod csv;

/// Append-only destination for readings.
pub trait RateSink {
    /// Persist one reading. A failed append loses the reading.
    async fn append(&self, reading: &RateReading) -> Result<(), ScrapeError>;
}
