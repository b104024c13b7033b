//! AI Request Dispatcher
//!
//! Runs a caller-supplied operation against the client pool with rotation and
//! bounded retries.
//!
//! Per round every client is tried at most once, in rotation order:
//! - quota exhaustion aborts the whole call, since it is account-wide;
//! - auth and rate-limit failures are key-local, so the next client is tried
//!   straight away;
//! - a transient failure abandons the round and the call backs off before the
//!   next sweep, unless this was the last round;
//! - anything else is returned unchanged.

use crate::config::BackoffConfig;
use crate::error::{AiError, ErrorKind, Result};
use crate::router::key_pool::{ClientPool, PoolClient, PoolStats};
use crate::router::retry::RoundBackoff;
use crate::router::strategy::{resolve_order, RotationCursor};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of retry rounds
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Per-call options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Number of rounds; values below 1 are treated as 1
    pub max_retries: u32,

    /// Pin the rotation start (any integer, wrapped into the pool)
    pub preferred_key: Option<i64>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            preferred_key: None,
        }
    }
}

impl ExecuteOptions {
    /// Options with an optional preferred start index
    pub fn preferred(preferred_key: Option<i64>) -> Self {
        Self {
            preferred_key,
            ..Self::default()
        }
    }

    /// Set the number of rounds
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Owns the pool and the round-robin cursor
#[derive(Debug)]
pub struct Dispatcher<G> {
    pool: ClientPool<G>,
    cursor: RotationCursor,
    backoff: BackoffConfig,
}

impl<G> Dispatcher<G> {
    /// Create a dispatcher over `pool`
    pub fn new(pool: ClientPool<G>, backoff: BackoffConfig) -> Self {
        Self {
            pool,
            cursor: RotationCursor::new(),
            backoff,
        }
    }

    /// Whether any client is configured
    pub fn is_enabled(&self) -> bool {
        !self.pool.is_empty()
    }

    /// Number of clients in the pool
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// The client pool
    pub fn pool(&self) -> &ClientPool<G> {
        &self.pool
    }

    /// Usage statistics for every client
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Run `operation` with rotation, retries and backoff.
    ///
    /// The operation receives one client per attempt and performs a single
    /// remote call with it.
    pub async fn execute<T, F, Fut>(&self, mut operation: F, options: ExecuteOptions) -> Result<T>
    where
        F: FnMut(Arc<PoolClient<G>>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.pool.is_empty() {
            warn!("AI request rejected: client pool is empty");
            return Err(AiError::NotInitialized);
        }

        let rounds = options.max_retries.max(1);
        let mut schedule = RoundBackoff::new(&self.backoff);
        let mut last_error: Option<AiError> = None;

        for attempt in 0..rounds {
            let final_round = attempt + 1 == rounds;
            let order = resolve_order(&self.cursor, options.preferred_key, self.pool.len());
            debug!(attempt, ?order, "starting dispatch round");

            for index in order {
                let Some(client) = self.pool.get(index) else {
                    continue;
                };

                client.record_attempt();
                let err = match operation(Arc::clone(client)).await {
                    Ok(value) => {
                        client.record_success();
                        debug!(client = index, attempt, "AI request succeeded");
                        return Ok(value);
                    }
                    Err(err) => err,
                };

                let kind = err.kind();
                client.record_failure(kind);

                match kind {
                    ErrorKind::QuotaExhausted => {
                        warn!(client = index, key = client.fingerprint(), error = %err, "AI quota exhausted, aborting");
                        return Err(err);
                    }
                    ErrorKind::Auth | ErrorKind::RateLimited => {
                        warn!(client = index, key = client.fingerprint(), kind = kind.label(), error = %err, "trying next client");
                        last_error = Some(err);
                    }
                    ErrorKind::Transient if !final_round => {
                        warn!(client = index, attempt, error = %err, "transient failure, abandoning round");
                        last_error = Some(err);
                        break;
                    }
                    _ => {
                        warn!(client = index, attempt, kind = kind.label(), error = %err, "AI request failed");
                        return Err(err);
                    }
                }
            }

            if !final_round {
                let delay = schedule.next_delay();
                info!(attempt, delay_ms = delay.as_millis() as u64, "backing off before next round");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or(AiError::NotInitialized))
    }
}
