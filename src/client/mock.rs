//! Scripted generator for tests

use crate::client::TextGenerator;
use crate::error::{AiError, Result};
use crate::router::ClientPool;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Order in which clients were called, by pool index
pub(crate) type CallLog = Arc<Mutex<Vec<usize>>>;

/// Replays queued outcomes, then repeats `fallback` forever
pub(crate) struct ScriptedGenerator {
    id: usize,
    queue: Mutex<VecDeque<Result<String>>>,
    fallback: Result<String>,
    prompts: Mutex<Vec<String>>,
    log: CallLog,
}

impl ScriptedGenerator {
    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.log.lock().push(self.id);
        let next = self.queue.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Build a pool where client `i` replays `scripts[i]`.
///
/// Once a script runs out the client fails with a fatal error, so tests
/// notice unexpected extra calls.
pub(crate) fn scripted_pool(scripts: Vec<Vec<Result<String>>>) -> (ClientPool<ScriptedGenerator>, CallLog) {
    let exhausted = Err(AiError::Upstream {
        status: 500,
        message: "script exhausted".to_string(),
    });
    pool_with_fallback(scripts, exhausted)
}

/// Like [`scripted_pool`] but every client repeats `fallback` after its script
pub(crate) fn pool_with_fallback(
    scripts: Vec<Vec<Result<String>>>,
    fallback: Result<String>,
) -> (ClientPool<ScriptedGenerator>, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let generators = scripts
        .into_iter()
        .enumerate()
        .map(|(id, script)| ScriptedGenerator {
            id,
            queue: Mutex::new(script.into()),
            fallback: fallback.clone(),
            prompts: Mutex::new(Vec::new()),
            log: log.clone(),
        })
        .collect();
    (ClientPool::from_generators(generators), log)
}

pub(crate) fn transient() -> AiError {
    AiError::Transient {
        status: 503,
        message: "model overloaded".to_string(),
    }
}

pub(crate) fn auth() -> AiError {
    AiError::Auth {
        status: 401,
        message: "API key not valid".to_string(),
    }
}

pub(crate) fn rate_limited() -> AiError {
    AiError::RateLimited {
        status: 429,
        message: "Too Many Requests".to_string(),
    }
}

pub(crate) fn quota() -> AiError {
    AiError::QuotaExhausted {
        message: "You exceeded your current quota".to_string(),
    }
}
