//! Bounded status polling.
//!
//! # Responsibilities
//! - Wait an initial delay, then refresh at a fixed interval
//! - Succeed on a target status, fail fast on errors and unexpected statuses
//! - Stop at the deadline or on shutdown, even mid-sleep
//!
//! # Design Decisions
//! - One generic loop for every kind; callers supply the refresh closure and status sets
//! - No retry of refresh errors here; the first error ends the poll
//! - Sleeps and refreshes are both bounded by the deadline, so a poll never
//!   overruns its timeout by more than scheduling jitter
//! - Stopping locally never sends anything to the remote side

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, Instant};

use crate::observability::metrics;

/// Why a poll stopped without reaching a target status.
#[derive(Debug, Error)]
pub enum PollError<T, S, E>
where
    T: Debug,
    S: Debug + Display,
    E: std::error::Error + 'static,
{
    /// The deadline passed; carries the last value seen, if any.
    #[error("timed out after {elapsed:?}")]
    Timeout { elapsed: Duration, last: Option<T> },

    /// A status outside both the pending and target sets.
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: S, value: T },

    /// The refresh call failed.
    #[error(transparent)]
    Refresh(E),

    /// Shutdown was requested while waiting.
    #[error("cancelled")]
    Cancelled { last: Option<T> },
}

impl<T: Debug, S: Debug + Display, E: std::error::Error + 'static> PollError<T, S, E> {
    fn label(&self) -> &'static str {
        match self {
            PollError::Timeout { .. } => "timeout",
            PollError::UnexpectedStatus { .. } => "unexpected_status",
            PollError::Refresh(_) => "refresh_error",
            PollError::Cancelled { .. } => "cancelled",
        }
    }
}

/// A configured polling loop.
#[derive(Debug)]
pub struct Poller {
    timeout: Duration,
    delay: Duration,
    interval: Duration,
    shutdown: Option<broadcast::Receiver<()>>,
    label: String,
}

impl Poller {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            delay: Duration::ZERO,
            interval: Duration::from_secs(1),
            shutdown: None,
            label: String::new(),
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop with `Cancelled` when this receiver fires.
    pub fn cancel_on(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Name used in log events, e.g. `health_monitor hm-1`.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Refresh until a status in `target` is observed.
    ///
    /// `refresh` returns the current value together with its status.
    pub async fn run<T, S, E, F, Fut>(
        self,
        pending: &[S],
        target: &[S],
        refresh: F,
    ) -> Result<T, PollError<T, S, E>>
    where
        T: Debug,
        S: Debug + Display + PartialEq + Copy,
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(T, S), E>>,
    {
        let started = Instant::now();
        let label = self.label.clone();
        let result = self.poll_loop(started, pending, target, refresh).await;

        let elapsed = started.elapsed();
        match &result {
            Ok(_) => {
                tracing::debug!(resource = %label, elapsed_ms = elapsed.as_millis() as u64, "Poll reached target status");
                metrics::record_poll("success", elapsed);
            }
            Err(e) => {
                tracing::warn!(resource = %label, elapsed_ms = elapsed.as_millis() as u64, error = %e, "Poll failed");
                metrics::record_poll(e.label(), elapsed);
            }
        }
        result
    }

    async fn poll_loop<T, S, E, F, Fut>(
        mut self,
        started: Instant,
        pending: &[S],
        target: &[S],
        mut refresh: F,
    ) -> Result<T, PollError<T, S, E>>
    where
        T: Debug,
        S: Debug + Display + PartialEq + Copy,
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(T, S), E>>,
    {
        let deadline = started + self.timeout;
        let mut shutdown = self.shutdown.take();
        let mut wake = started + self.delay;
        let mut last: Option<T> = None;

        loop {
            tokio::select! {
                _ = time::sleep_until(wake.min(deadline)) => {}
                _ = cancelled(&mut shutdown) => {
                    return Err(PollError::Cancelled { last });
                }
            }

            if Instant::now() >= deadline {
                return Err(PollError::Timeout {
                    elapsed: started.elapsed(),
                    last,
                });
            }

            let refreshed = tokio::select! {
                refreshed = time::timeout_at(deadline, refresh()) => refreshed,
                _ = cancelled(&mut shutdown) => {
                    return Err(PollError::Cancelled { last });
                }
            };

            let (value, status) = match refreshed {
                Err(_) => {
                    return Err(PollError::Timeout {
                        elapsed: started.elapsed(),
                        last,
                    })
                }
                Ok(Err(e)) => return Err(PollError::Refresh(e)),
                Ok(Ok(observed)) => observed,
            };

            if target.contains(&status) {
                return Ok(value);
            }
            if !pending.contains(&status) {
                return Err(PollError::UnexpectedStatus { status, value });
            }

            tracing::debug!(resource = %self.label, status = %status, "Still pending");
            last = Some(value);
            wake = Instant::now() + self.interval;
        }
    }
}

/// Resolves when shutdown is signalled; never resolves without a receiver.
async fn cancelled(shutdown: &mut Option<broadcast::Receiver<()>>) {
    match shutdown {
        Some(rx) => match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}
