//! Log sinks: stdout plus an append-only log file.
//!
//! [`init`] installs a global `tracing` subscriber with two fmt layers and
//! returns a [`LogGuard`]. Dropping the guard is fine; calling
//! [`LogGuard::shutdown`] additionally syncs the file to disk.

use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "currency_scraper.log";

/// Handle on the file sink, kept by `main` until the loop stops.
#[derive(Debug)]
pub struct LogGuard {
    file: File,
    path: PathBuf,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the log file to durable storage.
    pub fn shutdown(self) -> io::Result<()> {
        self.file.sync_all()
    }
}

/// Open `path` for appending, creating it and its parent directory if needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Both sinks use
/// RFC 3339 UTC timestamps; the file sink has ANSI colors disabled.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init(path: &Path) -> Result<LogGuard, Box<dyn Error>> {
    let file = open_log_file(path)?;
    let handle = file.try_clone()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stdout);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard {
        file: handle,
        path: path.to_path_buf(),
    })
}
