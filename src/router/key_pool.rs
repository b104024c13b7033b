//! Client Pool Management
//!
//! Holds one generation client per configured API key. The pool is built once
//! at startup and never changes afterwards; only the per-client usage counters
//! move.

use crate::client::TextGenerator;
use crate::error::{ErrorKind, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use zeroize::Zeroize;

/// An API key, redacted in Debug/Display and wiped on drop
pub struct Credential(String);

impl Credential {
    /// Wrap a raw key
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the raw key (only for building requests)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for logs, e.g. `AIza…9xQk`
    pub fn fingerprint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}…{}", head, tail)
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Split a comma-separated key list and fall back to the legacy single key.
///
/// Entries are trimmed, empty entries dropped, duplicates removed keeping the
/// first occurrence. The legacy key is only consulted when the list yields
/// nothing.
pub fn parse_credentials(list: Option<&str>, legacy: Option<&str>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();

    for entry in list.unwrap_or_default().split(',') {
        let entry = entry.trim();
        if !entry.is_empty() && !keys.iter().any(|k| k == entry) {
            keys.push(entry.to_string());
        }
    }

    if keys.is_empty() {
        if let Some(key) = legacy.map(str::trim).filter(|k| !k.is_empty()) {
            keys.push(key.to_string());
        }
    }

    keys
}

/// A generation client bound to one credential, with usage tracking
#[derive(Debug)]
pub struct PoolClient<G> {
    /// Position in the pool
    index: usize,

    /// Masked credential for logs
    fingerprint: String,

    /// The remote client
    generator: G,

    /// Total operations attempted with this client
    requests: AtomicU64,

    /// Operations that succeeded
    successes: AtomicU64,

    /// Operations that failed
    failures: AtomicU64,

    /// Classification of the most recent failure
    last_error: RwLock<Option<ErrorKind>>,

    /// Time of the most recent attempt
    last_used: RwLock<Option<DateTime<Utc>>>,
}

impl<G: TextGenerator> PoolClient<G> {
    /// Run one generation call against this client
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.generator.generate(model, prompt).await
    }
}

impl<G> PoolClient<G> {
    fn new(index: usize, fingerprint: String, generator: G) -> Self {
        Self {
            index,
            fingerprint,
            generator,
            requests: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            last_error: RwLock::new(None),
            last_used: RwLock::new(None),
        }
    }

    /// Position of this client in the pool
    pub fn index(&self) -> usize {
        self.index
    }

    /// Masked credential
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The underlying generator
    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub(crate) fn record_attempt(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        *self.last_used.write() = Some(Utc::now());
    }

    pub(crate) fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, kind: ErrorKind) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(kind);
    }

    /// Snapshot of this client's counters
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            index: self.index,
            key: self.fingerprint.clone(),
            requests: self.requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_error: *self.last_error.read(),
            last_used: *self.last_used.read(),
        }
    }
}

/// Ordered, immutable set of clients
#[derive(Debug)]
pub struct ClientPool<G> {
    clients: Vec<Arc<PoolClient<G>>>,
}

impl<G> ClientPool<G> {
    /// Build a pool with one client per credential, in order
    pub fn from_credentials<F>(credentials: Vec<String>, mut build: F) -> Result<Self>
    where
        F: FnMut(Credential) -> Result<G>,
    {
        let mut clients = Vec::with_capacity(credentials.len());
        for (index, raw) in credentials.into_iter().enumerate() {
            let credential = Credential::new(raw);
            let fingerprint = credential.fingerprint();
            let generator = build(credential)?;
            clients.push(Arc::new(PoolClient::new(index, fingerprint, generator)));
        }

        if clients.is_empty() {
            tracing::warn!("no AI API keys configured, AI features are disabled");
        } else {
            tracing::info!(clients = clients.len(), "AI client pool initialized");
        }

        Ok(Self { clients })
    }

    /// Build a pool directly from ready-made generators
    pub fn from_generators(generators: Vec<G>) -> Self {
        let clients = generators
            .into_iter()
            .enumerate()
            .map(|(index, generator)| {
                Arc::new(PoolClient::new(index, format!("client-{}", index), generator))
            })
            .collect();
        Self { clients }
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Get the number of clients in the pool
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Client at `index`
    pub fn get(&self, index: usize) -> Option<&Arc<PoolClient<G>>> {
        self.clients.get(index)
    }

    /// Get statistics about the pool
    pub fn stats(&self) -> PoolStats {
        let clients: Vec<ClientStats> = self.clients.iter().map(|c| c.stats()).collect();
        PoolStats {
            total_clients: clients.len(),
            total_requests: clients.iter().map(|c| c.requests).sum(),
            clients,
        }
    }
}

/// Usage counters for a single client
#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub index: usize,
    pub key: String,
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub last_error: Option<ErrorKind>,
    pub last_used: Option<DateTime<Utc>>,
}

/// Statistics about the whole pool
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub total_clients: usize,
    pub total_requests: u64,
    pub clients: Vec<ClientStats>,
}
