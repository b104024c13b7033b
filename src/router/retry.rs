//! Retry Delays
//!
//! Delay between retry rounds: `min(cap, initial * 2^attempt + jitter)` with
//! jitter drawn uniformly from `[0, jitter)`.

use crate::config::BackoffConfig;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use rand::Rng;
use std::time::Duration;

/// Per-call delay schedule
pub struct RoundBackoff {
    /// Doubling sequence capped at `cap`, no randomization
    exponential: ExponentialBackoff,

    cap: Duration,

    jitter: Duration,
}

impl RoundBackoff {
    /// Start a fresh schedule at attempt 0
    pub fn new(config: &BackoffConfig) -> Self {
        let initial = Duration::from_millis(config.initial_delay_ms);
        let cap = Duration::from_millis(config.max_delay_ms);

        let exponential = ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: cap,
            max_elapsed_time: None,
            ..Default::default()
        };

        Self {
            exponential,
            cap,
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }

    /// Delay to sleep after the current round; advances the schedule
    pub fn next_delay(&mut self) -> Duration {
        let base = self.exponential.next_backoff().unwrap_or(self.cap);
        (base + self.sample_jitter()).min(self.cap)
    }

    fn sample_jitter(&self) -> Duration {
        let bound = self.jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..bound))
    }
}
