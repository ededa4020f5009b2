//! Bounded retry with transient/terminal error classification.
//!
//! The advisory service occasionally answers with a gateway error (HTTP
//! 502/503/504) during deploys or load spikes. Those are worth retrying and,
//! when the whole budget is spent on them, worth reporting as "service
//! unreachable" rather than failing the check. Anything else (4xx, transport
//! failures) is terminal: it is retried within the budget too, but once the
//! budget is exhausted it is the error that propagates.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::client::RemoteError;

/// Default number of total attempts per fetch.
pub const DEFAULT_RETRY_TIMES: u32 = 5;

/// Fixed pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Why a retried operation ultimately gave up.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every classified attempt hit a gateway error; the service is
    /// temporarily unreachable.
    #[error("advisory service unreachable after {attempts} attempts")]
    AllTransient { attempts: u32 },

    /// A non-gateway failure was observed; retries cannot fix it.
    #[error(transparent)]
    Terminal(RemoteError),
}

/// Failure counters scoped to a single retried operation.
///
/// Kept as an explicit value rather than closure-captured mutable state so
/// the classification rules can be tested in isolation.
#[derive(Debug, Default)]
pub struct RetryState {
    /// Number of attempts classified as a transient gateway failure.
    pub gateway_failures: u32,
    /// Most recent failure that was not a gateway error.
    pub last_terminal: Option<RemoteError>,
}

impl RetryState {
    /// Classifies one failed attempt.
    ///
    /// Gateway errors only bump the counter; they never displace a recorded
    /// terminal error, so terminal errors keep reporting priority even when
    /// a transient failure happens afterwards.
    pub fn observe(&mut self, err: RemoteError) {
        if err.is_gateway() {
            self.gateway_failures += 1;
        } else {
            self.last_terminal = Some(err);
        }
    }
}

/// Sequential retry policy with a fixed pause between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    times: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            times: DEFAULT_RETRY_TIMES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(times: u32) -> Self {
        Self {
            times: times.max(1),
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn times(&self) -> u32 {
        self.times
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` up to `times` total attempts.
    ///
    /// Failures are classified only *between* attempts — the final attempt's
    /// error is never fed to [`RetryState::observe`] — so the gateway counter
    /// tops out at `times - 1`. The exhaustion check therefore compares
    /// against `times - 1`: when it matches, every classifiable failure was
    /// transient and no terminal error was ever recorded, and the whole run
    /// degrades to [`RetryError::AllTransient`]. Otherwise the last recorded
    /// terminal error wins, falling back to the raw final error.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut state = RetryState::default();

        for attempt in 1..=self.times {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.times => {
                    debug!(attempt, error = %err, "advisory fetch failed, retrying");
                    state.observe(err);
                    sleep(self.delay).await;
                }
                Err(err) => {
                    if state.gateway_failures == self.times - 1 {
                        return Err(RetryError::AllTransient {
                            attempts: self.times,
                        });
                    }
                    return Err(RetryError::Terminal(state.last_terminal.unwrap_or(err)));
                }
            }
        }

        unreachable!("retry loop always returns within the attempt budget")
    }
}
