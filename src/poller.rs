//! The poll loop: fetch, extract, persist, sleep, repeat.
//!
//! # State machine
//!
//! ```text
//!          tick                 value            wait elapsed
//!   Idle ───────▶ Fetching ─┬──────────▶ Success ──┐
//!    ▲                      │ error/none            ├──▶ Sleeping ──▶ Idle
//!    │                      └──────────▶ Failure ──┘        │
//!    └──────────────────────────────────────────────────────┘
//!
//!   any state at an iteration boundary ── shutdown ──▶ Stopped
//! ```
//!
//! # Back-off
//!
//! Classified failures (transport, bad status, extraction miss) increment a
//! consecutive-failure counter. While the counter is at or above
//! [`MAX_FAILURES`] the sleep doubles; the first success resets the counter
//! and the very next sleep is back to the base interval.
//!
//! Unexpected errors, including panics caught inside a cycle, pause exactly
//! one base interval and leave the counter alone.

use crate::error::ScrapeError;
use crate::models::RateReading;
use crate::outputs::RateSink;
use crate::scrapers::RateSource;
use crate::scrapers::extract::extract_from_markup;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Consecutive failures after which the sleep interval doubles.
pub const MAX_FAILURES: u32 = 5;

/// Base interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Success,
    Failure,
    Sleeping,
    Stopped,
}

/// Cooperative cancellation token shared between the loop and whoever stops it.
///
/// The flag is checked at iteration boundaries; the notification wakes the
/// loop out of its sleep.
#[derive(Debug, Default)]
pub struct Shutdown {
    triggered: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Request the loop to stop. Calling it more than once is harmless.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            self.notify.notify_one();
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once [`trigger`](Self::trigger) has been called, before or after.
    pub async fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Consecutive classified failures since the last success.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FailureCounter(u32);

impl FailureCounter {
    pub fn get(self) -> u32 {
        self.0
    }

    /// Count one more failure and return the new total.
    pub fn record_failure(&mut self) -> u32 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn is_backing_off(self) -> bool {
        self.0 >= MAX_FAILURES
    }
}

/// Sleep that follows a classified cycle: doubled while backing off.
pub fn backoff_wait(interval: Duration, failures: FailureCounter) -> Duration {
    if failures.is_backing_off() {
        interval.saturating_mul(2)
    } else {
        interval
    }
}

/// How a single cycle ended.
#[derive(Debug)]
pub enum Outcome {
    /// A rate was extracted (and handed to the sink).
    Success(RateReading),
    /// Transport failure or extraction miss; counted.
    Failure(ScrapeError),
    /// Anything else; logged, not counted.
    Unexpected(ScrapeError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(reading) => write!(f, "success ({})", reading.value()),
            Outcome::Failure(e) => write!(f, "failure: {e}"),
            Outcome::Unexpected(e) => write!(f, "unexpected: {e}"),
        }
    }
}

/// Result of [`Poller::poll_once`]: what happened and how long to wait.
#[derive(Debug)]
pub struct Cycle {
    pub outcome: Outcome,
    pub wait: Duration,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic in poll cycle: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic in poll cycle: {s}")
    } else {
        "panic in poll cycle".to_string()
    }
}

/// Drives a [`RateSource`] into a [`RateSink`] on a fixed interval.
#[derive(Debug)]
pub struct Poller<S, K> {
    source: S,
    sink: K,
    interval: Duration,
    failures: FailureCounter,
    state: PollState,
    shutdown: Arc<Shutdown>,
}

impl<S, K> Poller<S, K>
where
    S: RateSource,
    K: RateSink,
{
    pub fn new(source: S, sink: K, interval: Duration, shutdown: Arc<Shutdown>) -> Self {
        Self {
            source,
            sink,
            interval,
            failures: FailureCounter::default(),
            state: PollState::Idle,
            shutdown,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn failures(&self) -> u32 {
        self.failures.get()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    fn transition(&mut self, next: PollState) {
        debug!(from = ?self.state, to = ?next, "Poll state change");
        self.state = next;
    }

    /// Fetch, extract and persist one reading.
    ///
    /// A failed append is logged and swallowed: the rate was obtained, only
    /// the record of it is lost.
    async fn fetch_reading(&self) -> Result<RateReading, ScrapeError> {
        let page = self.source.fetch().await?;
        let value = extract_from_markup(&page).ok_or(ScrapeError::NotFound)?;
        let reading = RateReading::now(value, self.source.label());

        if let Err(e) = self.sink.append(&reading).await {
            error!(error = %e, value, "Failed to save reading; it will not be retried");
        }
        Ok(reading)
    }

    /// Run a single `Fetching -> Success | Failure` pass.
    #[instrument(level = "debug", skip_all, fields(source = self.source.label()))]
    pub async fn poll_once(&mut self) -> Cycle {
        self.transition(PollState::Fetching);

        let result = AssertUnwindSafe(self.fetch_reading())
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ScrapeError::Unexpected(panic_message(&*payload))));

        let outcome = match result {
            Ok(reading) => {
                self.failures.reset();
                info!(value = reading.value(), source = reading.source(), "{reading}");
                self.transition(PollState::Success);
                Outcome::Success(reading)
            }
            Err(e) if e.is_classified() => {
                let failures = self.failures.record_failure();
                warn!(
                    failures,
                    error = %e,
                    "Failed to get rate. Consecutive failures: {failures}"
                );
                self.transition(PollState::Failure);
                Outcome::Failure(e)
            }
            Err(e) => {
                error!(error = %e, "Unexpected error");
                self.transition(PollState::Failure);
                Outcome::Unexpected(e)
            }
        };

        let wait = match outcome {
            Outcome::Unexpected(_) => self.interval,
            _ => backoff_wait(self.interval, self.failures),
        };
        Cycle { outcome, wait }
    }

    /// Poll until the shutdown token fires. Never fails.
    pub async fn run(&mut self) {
        info!(
            interval_secs = self.interval().as_secs(),
            source = self.source.label(),
            "Starting USD/RUB rate scraping every {} seconds",
            self.interval().as_secs()
        );

        let shutdown = Arc::clone(&self.shutdown);
        loop {
            if shutdown.is_triggered() {
                break;
            }

            let cycle = self.poll_once().await;
            debug!(outcome = %cycle.outcome, "Poll cycle finished");
            if shutdown.is_triggered() {
                break;
            }

            self.transition(PollState::Sleeping);
            debug!(wait_ms = cycle.wait.as_millis() as u64, "Sleeping until next poll");
            let stopped = tokio::select! {
                _ = sleep(cycle.wait) => false,
                _ = shutdown.wait() => true,
            };
            if stopped {
                break;
            }
            self.transition(PollState::Idle);
        }

        self.transition(PollState::Stopped);
        info!("Scraping stopped by user");
    }
}
