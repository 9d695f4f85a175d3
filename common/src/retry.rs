use crate::Error;
use rand::Rng;
use std::{future::Future, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay between two attempts
#[derive(Clone, Debug, PartialEq)]
pub struct Backoff {
    /// Delay after the first failed attempt
    pub initial: Duration,
    /// Multiplier applied for each further attempt
    pub factor: f64,
    /// Up to this fraction of the delay is added at random
    pub jitter: f64,
    /// Upper bound of the delay, before jitter
    pub cap: Option<Duration>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(10),
            factor: 1.0,
            jitter: 0.1,
            cap: None,
        }
    }
}

impl Backoff {
    /// Delay to wait after the given (1-based) failed attempt
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let mut base = scale(self.initial, self.factor.max(1.0).powi(exp).min(1e6));
        if let Some(cap) = self.cap {
            base = base.min(cap);
        }
        if self.jitter > 0.0 {
            let extra: f64 = rand::rng().random::<f64>() * self.jitter;
            base + scale(base, extra)
        } else {
            base
        }
    }
}

fn scale(d: Duration, by: f64) -> Duration {
    Duration::from_nanos((d.as_nanos() as f64 * by).round() as u64)
}

/// Bounded retry of writes rejected because of a stale resourceVersion
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff::default(),
        }
    }
}

#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    last_error: Option<Error>,
}

pub(crate) enum Outcome<T> {
    Done(T),
    Failed(Error),
    Exhausted { attempts: u32, last_error: Error },
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn no_wait() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff {
                initial: Duration::ZERO,
                factor: 1.0,
                jitter: 0.0,
                cap: None,
            },
        }
    }

    /// Run `op` until it succeeds, fails with something else than a conflict,
    /// or the attempts are used up. Each call of `op` is expected to re-read
    /// the object it writes.
    pub(crate) async fn on_conflict<T, F, Fut>(&self, cancel: &CancellationToken, mut op: F) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut state = RetryState::default();
        while state.attempt < max_attempts {
            if cancel.is_cancelled() {
                return Outcome::Failed(Error::Cancelled);
            }
            state.attempt += 1;
            match op().await {
                Ok(value) => {
                    if state.attempt > 1 {
                        debug!("write succeeded on attempt {}", state.attempt);
                    }
                    return Outcome::Done(value);
                }
                Err(e) if e.is_conflict() => {
                    warn!("attempt {}/{} hit a conflict: {e}", state.attempt, max_attempts);
                    state.last_error = Some(e);
                    if state.attempt < max_attempts {
                        let delay = self.backoff.delay(state.attempt);
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return Outcome::Failed(Error::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
                Err(e) => return Outcome::Failed(e),
            }
        }
        Outcome::Exhausted {
            attempts: state.attempt,
            last_error: state
                .last_error
                .unwrap_or_else(|| Error::Other("retry loop ended without an attempt".to_string())),
        }
    }
}
