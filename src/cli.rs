//! Command-line interface definitions.
//!
//! Every option has a default, so running the binary with no arguments polls
//! investing.com once a minute into `usd_rub_rates.csv`. Each option can also
//! be set through an environment variable.

use crate::logging::DEFAULT_LOG_FILE;
use crate::outputs::csv::DEFAULT_PATH;
use crate::poller::DEFAULT_INTERVAL;
use crate::scrapers::investing::DEFAULT_URL;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Command-line arguments for the scraper.
///
/// # Examples
///
/// ```sh
/// # Defaults: every 60 seconds, into ./usd_rub_rates.csv
/// usd_rub_scraper
///
/// # Poll every five minutes into a data directory
/// usd_rub_scraper --interval 300 --output /var/lib/rates/usd_rub.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base poll interval in seconds (doubled after repeated failures)
    #[arg(
        short,
        long,
        env = "SCRAPER_INTERVAL",
        default_value_t = DEFAULT_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// CSV file readings are appended to
    #[arg(short, long, env = "SCRAPER_OUTPUT", default_value = DEFAULT_PATH)]
    pub output: PathBuf,

    /// Log file written alongside stdout
    #[arg(short, long, env = "SCRAPER_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Quote page to scrape
    #[arg(long, env = "SCRAPER_URL", default_value = DEFAULT_URL)]
    pub url: Url,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}
