//! Screenlog AI - request dispatcher for the movie/TV tracker's AI features
//!
//! Spreads generation calls over a pool of Gemini API keys with round-robin
//! rotation, retries transient failures with capped exponential backoff and
//! extracts JSON from model output that wraps it in prose or code fences.

use std::path::Path;
use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod router;

pub use api::ReviewAssistant;
pub use client::{GeminiClient, GenerationSettings, TextGenerator};
pub use config::{AiConfig, BackoffConfig, ConfigLoader};
pub use error::{AiError, ErrorKind, Result};
pub use router::{Dispatcher, ExecuteOptions, PoolStats, PREFERRED_KEY_HEADER};

use client::gemini::build_http_client;
use router::ClientPool;

/// The assembled AI service: config, key pool, dispatcher and assistant
pub struct AiService {
    config: AiConfig,

    dispatcher: Arc<Dispatcher<GeminiClient>>,

    assistant: ReviewAssistant<GeminiClient>,
}

impl AiService {
    /// Create a service from `.env`, config files and the environment
    pub fn from_env() -> Result<Self> {
        let loader = ConfigLoader::new()?;
        Self::from_config(loader.into_config())
    }

    /// Create a service with a custom config path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let loader = ConfigLoader::from_path(path)?;
        Self::from_config(loader.into_config())
    }

    /// Create a service from a config object.
    ///
    /// An empty key list is not an error: the service starts disabled and
    /// every call fails with `AiError::NotInitialized`.
    pub fn from_config(config: AiConfig) -> Result<Self> {
        let http = build_http_client(config.request_timeout(), config.connect_timeout())?;
        let settings = config.generation();

        let pool = ClientPool::from_credentials(config.credentials(), |credential| {
            GeminiClient::new(http.clone(), config.base_url.as_str(), &credential, settings)
        })?;

        let dispatcher = Arc::new(Dispatcher::new(pool, config.backoff));
        let assistant =
            ReviewAssistant::new(Arc::clone(&dispatcher), config.model.clone(), config.max_retries);

        tracing::debug!(
            model = %config.model,
            clients = dispatcher.pool_size(),
            max_retries = config.max_retries,
            "AI service ready"
        );

        Ok(Self {
            config,
            dispatcher,
            assistant,
        })
    }

    /// Review helpers
    pub fn assistant(&self) -> &ReviewAssistant<GeminiClient> {
        &self.assistant
    }

    /// The dispatcher, for callers running their own prompts
    pub fn dispatcher(&self) -> &Arc<Dispatcher<GeminiClient>> {
        &self.dispatcher
    }

    /// The configuration the service was built from
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Whether at least one key is configured
    pub fn is_enabled(&self) -> bool {
        self.dispatcher.is_enabled()
    }

    /// Per-key usage counters for health reporting
    pub fn pool_stats(&self) -> PoolStats {
        self.dispatcher.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn config_for(server: &mockito::ServerGuard, keys: &[&str]) -> AiConfig {
        AiConfig {
            api_keys: keys.iter().map(|k| k.to_string()).collect(),
            model: "gemini-test".to_string(),
            base_url: format!("{}/v1beta", server.url()),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_service_without_keys_is_disabled() {
        let service = AiService::from_config(AiConfig::default()).unwrap();

        assert!(!service.is_enabled());
        assert_eq!(service.pool_stats().total_clients, 0);

        let err = assert_err!(service.assistant().remove_spoilers("text", None).await);
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(err.status(), 503);
    }

    #[tokio::test]
    async fn test_rejected_key_rotates_to_next() {
        let mut server = mockito::Server::new_async().await;
        let rejected = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "key-bad-0001")
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#)
            .create_async()
            .await;
        let accepted = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "key-good-0002")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"  A clean review.  "}]}}]}"#)
            .create_async()
            .await;

        let service =
            AiService::from_config(config_for(&server, &["key-bad-0001", "key-good-0002"])).unwrap();
        assert!(service.is_enabled());

        let text = service
            .assistant()
            .remove_spoilers("He was dead all along.", Some(0))
            .await
            .unwrap();
        assert_eq!(text, "A clean review.");

        rejected.assert_async().await;
        accepted.assert_async().await;

        let stats = service.pool_stats();
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.clients[0].failures, 1);
        assert_eq!(stats.clients[1].successes, 1);
    }

    #[tokio::test]
    async fn test_json_operation_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"```json\n{\"sentiment\":\"Positive\",\"score\":0.9,\"summary\":\"Loved it\"}\n```"}]}}]}"#,
            )
            .create_async()
            .await;

        let service = AiService::from_config(config_for(&server, &["only-key-123"])).unwrap();
        let analysis = service
            .assistant()
            .analyze_sentiment("Best film of the year", None)
            .await
            .unwrap();

        assert_eq!(analysis.sentiment, "positive");
        assert_eq!(analysis.summary, "Loved it");
    }
}
