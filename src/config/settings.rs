//! AI Settings
//!
//! Defines the configuration schema for the AI dispatcher.

use crate::client::GenerationSettings;
use crate::router::{parse_credentials, DEFAULT_MAX_RETRIES};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Root configuration structure
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API keys, in rotation order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub api_keys: Vec<String>,

    /// Legacy single key, used only when `api_keys` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Retry rounds per call
    pub max_retries: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,

    /// Whole-request timeout
    pub request_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Delay between retry rounds
    pub backoff: BackoffConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            temperature: 0.7,
            max_output_tokens: 1024,
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            backoff: BackoffConfig::default(),
        }
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl AiConfig {
    /// Keys the pool should be built from, in order.
    ///
    /// `api_keys` entries may themselves be comma-separated lists.
    pub fn credentials(&self) -> Vec<String> {
        let joined = self.api_keys.join(",");
        parse_credentials(Some(&joined), self.api_key.as_deref())
    }

    /// Sampling settings for the generation client
    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Backoff between retry rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first round
    pub initial_delay_ms: u64,

    /// Upper bound for any delay, jitter included
    pub max_delay_ms: u64,

    /// Random extra delay is drawn from `[0, jitter_ms)`
    pub jitter_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 8000,
            jitter_ms: 500,
        }
    }
}
