//! CSV record writer.
//!
//! The file is created with a header row the first time the scraper runs and
//! only ever appended to afterwards. Each reading is written as one complete
//! line in a single `write_all` on a file opened in append mode, so a crash
//! never leaves half a row behind another process's view.

use super::RateSink;
use crate::error::ScrapeError;
use crate::models::RateReading;
use crate::utils::ensure_parent_dir;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Default record location, relative to the working directory.
pub const DEFAULT_PATH: &str = "usd_rub_rates.csv";

/// Column names written once at the top of a new record.
pub const HEADER: [&str; 3] = ["Timestamp", "USD/RUB Rate", "Source"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        let cell = cell.as_ref();
        if i > 0 {
            write!(w, ",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Append-only CSV file of readings.
#[derive(Debug, Clone)]
pub struct CsvRecord {
    path: PathBuf,
}

impl CsvRecord {
    /// Open the record at `path`, creating it with a header row if absent.
    ///
    /// An existing file is left untouched, header included.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref().to_path_buf();

        if !fs::try_exists(&path).await? {
            ensure_parent_dir(&path).await?;
            let mut line = Vec::new();
            write_row(&mut line, &HEADER)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await?;
            file.write_all(&line).await?;
            file.flush().await?;
            info!("Created record with header row");
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RateSink for CsvRecord {
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn append(&self, reading: &RateReading) -> Result<(), ScrapeError> {
        let mut line = Vec::new();
        write_row(&mut line, &reading.to_row())?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!(value = reading.value(), "Appended reading");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WEBPAGE_SOURCE;
    use chrono::{Local, TimeZone};

    fn reading(value: f64) -> RateReading {
        let ts = Local.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap();
        RateReading::at(ts, value, WEBPAGE_SOURCE)
    }

    #[test]
    fn test_write_row_plain() {
        let mut out = Vec::new();
        write_row(&mut out, &["a", "b", "c"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b,c\n");
    }

    #[test]
    fn test_write_row_quotes_when_needed() {
        let mut out = Vec::new();
        write_row(&mut out, &["a,b", "say \"hi\"", "c"]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"a,b\",\"say \"\"hi\"\"\",c\n"
        );
    }

    #[tokio::test]
    async fn test_open_creates_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");

        let record = CsvRecord::open(&path).await.unwrap();
        assert_eq!(record.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Timestamp,USD/RUB Rate,Source\n");
    }

    #[tokio::test]
    async fn test_open_creates_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/rates.csv");

        CsvRecord::open(&path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_open_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        std::fs::write(&path, "Timestamp,USD/RUB Rate,Source\nold,1.0,Webpage\n").unwrap();

        CsvRecord::open(&path).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("old,1.0,Webpage"));
    }

    #[tokio::test]
    async fn test_append_one_row_per_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let record = CsvRecord::open(&path).await.unwrap();

        record.append(&reading(91.23)).await.unwrap();
        record.append(&reading(91.3)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Timestamp,USD/RUB Rate,Source",
                "2025-05-06T14:30:00.000000,91.23,Webpage",
                "2025-05-06T14:30:00.000000,91.3,Webpage",
            ]
        );
    }

    #[tokio::test]
    async fn test_append_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let record = CsvRecord {
            path: dir.path().join("gone/rates.csv"),
        };

        let err = record.append(&reading(91.23)).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Persistence(_)));
        assert!(!err.is_classified());
    }
}
