//! Exponential backoff for flaky browser steps.

use std::fmt::Display;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::warn;

/// Retry bound and delay shape: `base * 2^attempt + uniform(0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Delay before the retry that follows failed attempt `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = if self.max_jitter.is_zero() {
            Duration::ZERO
        } else {
            self.max_jitter
                .mul_f64(rand::thread_rng().gen_range(0.0..=1.0))
        };
        backoff.saturating_add(jitter)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the attempt
    /// bound is reached. The last error is returned unchanged.
    ///
    /// With a `deadline`, no retry is started whose backoff would end past it.
    pub fn run<T, E, F, P>(
        &self,
        label: &str,
        deadline: Option<Instant>,
        mut op: F,
        is_transient: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts.max(1) || !is_transient(&e) {
                        return Err(e);
                    }
                    let delay = self.delay_for(attempt - 1);
                    if deadline.is_some_and(|d| Instant::now() + delay >= d) {
                        warn!("{label} failed (attempt {attempt}), no time left to retry: {e}");
                        return Err(e);
                    }
                    warn!(
                        "{label} failed (attempt {attempt}/{}), retrying after {:.2}s: {e}",
                        self.max_attempts,
                        delay.as_secs_f64()
                    );
                    std::thread::sleep(delay);
                }
            }
        }
    }
}
