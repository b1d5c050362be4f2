//! Self-imposed pacing between page requests.
//!
//! Every page is followed by a pause, whatever happened to it. With a
//! [`Backoff`] configured the pause grows while fetches keep failing and
//! drops back to the base interval after the next success.

use std::time::Duration;

use tokio::time::sleep;

use crate::{Backoff, Config};

/// Past this many failures the multiplier is already far beyond any sane cap.
const MAX_BACKOFF_EXPONENT: u32 = 64;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    backoff: Option<Backoff>,
    failures: u32,
}

impl RateLimiter {
    pub fn new(delay: Duration, backoff: Option<Backoff>) -> Self {
        Self {
            delay,
            backoff,
            failures: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.delay, config.backoff)
    }

    /// Fetch failures in a row so far.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Feeds the outcome of the page that just finished into the policy.
    pub fn record(&mut self, fetch_failed: bool) {
        if fetch_failed {
            self.failures = self.failures.saturating_add(1);
        } else {
            self.failures = 0;
        }
    }

    /// The pause owed before the next request.
    pub fn next_delay(&self) -> Duration {
        let Some(backoff) = self.backoff.filter(|_| self.failures > 0) else {
            return self.delay;
        };

        let exponent = self.failures.min(MAX_BACKOFF_EXPONENT) as i32;
        let grown = self.delay.as_secs_f64() * backoff.factor.powi(exponent);
        Duration::try_from_secs_f64(grown)
            .unwrap_or(backoff.max_delay)
            .min(backoff.max_delay)
            .max(self.delay)
    }

    /// Records the page outcome and sleeps for the resulting delay.
    /// Returns how long it slept.
    pub async fn pause(&mut self, fetch_failed: bool) -> Duration {
        self.record(fetch_failed);
        let delay = self.next_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        delay
    }
}
