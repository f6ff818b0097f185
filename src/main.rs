//! # USD/RUB Scraper
//!
//! Polls the USD/RUB quote page on investing.com, extracts the last price
//! and appends it with a timestamp to a CSV record.
//!
//! ## Usage
//!
//! ```sh
//! usd_rub_scraper                     # every 60 s into ./usd_rub_rates.csv
//! usd_rub_scraper -i 300 -o rates.csv # every 5 min into rates.csv
//! ```
//!
//! ## Architecture
//!
//! One sequential loop on a single task:
//! 1. **Fetching**: GET the quote page with browser-like headers
//! 2. **Extraction**: walk a selector fallback chain until a number parses
//! 3. **Persistence**: append `(timestamp, rate, source)` to the CSV
//! 4. **Sleeping**: wait one interval, or two after five failures in a row
//!
//! Ctrl-C stops the loop at the next iteration boundary or wakes it from
//! its sleep.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info};

mod cli;
mod error;
mod logging;
mod models;
mod outputs;
mod poller;
mod scrapers;
mod utils;

use cli::Cli;
use outputs::csv::CsvRecord;
use poller::{Poller, Shutdown};
use scrapers::investing::InvestingSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let log = logging::init(&args.log_file)?;
    let start_time = std::time::Instant::now();
    info!(log_file = %log.path().display(), "usd_rub_scraper starting up");
    debug!(?args, "Parsed CLI arguments");

    let record = match CsvRecord::open(&args.output).await {
        Ok(record) => record,
        Err(e) => {
            error!(
                path = %args.output.display(),
                error = %e,
                "Cannot initialize the CSV record (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    };
    info!(path = %record.path().display(), "Saving results to {}", record.path().display());

    let source = InvestingSource::new(args.url.clone())?;
    info!(url = %source.url(), "HTTP client ready");

    let shutdown = Shutdown::new();
    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received; stopping after the current step");
                signal.trigger();
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let mut poller = Poller::new(source, record, args.interval(), shutdown);
    poller.run().await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        failures = poller.failures(),
        state = ?poller.state(),
        "Execution complete"
    );

    log.shutdown()?;
    Ok(())
}
