//! Gemini Client
//!
//! `generateContent` over HTTP, bound to a single API key. Failures are
//! classified here so the dispatcher only ever sees [`AiError`] kinds.

use crate::client::TextGenerator;
use crate::error::{classify, AiError, Result};
use crate::router::Credential;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Sampling settings sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

/// Build the shared HTTP client used by every pool member
pub fn build_http_client(request_timeout: Duration, connect_timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AiError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Gemini API client bound to one key
pub struct GeminiClient {
    /// Inner reqwest client (shared connection pool)
    http: Client,

    /// API base, e.g. `https://generativelanguage.googleapis.com/v1beta`
    base_url: String,

    /// Pre-built auth headers
    headers: HeaderMap,

    settings: GenerationSettings,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for `credential`
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        credential: &Credential,
        settings: GenerationSettings,
    ) -> Result<Self> {
        let mut key = HeaderValue::from_str(credential.expose())
            .map_err(|e| AiError::Config(format!("Invalid API key format: {}", e)))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, key);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
            settings,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn send(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint(model))
            .headers(self.headers.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::parse(format!("invalid generateContent body: {}", e), &body))?;
        parsed.into_text()
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.send(model, prompt).await
    }
}

/// Classify a non-2xx response from its status and error envelope
fn classify_failure(status: u16, body: &str) -> AiError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{} ({})", envelope.error.message, code),
            None => envelope.error.message,
        },
        Err(_) => body.chars().take(500).collect(),
    };
    classify(Some(status), &message)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AiError::Upstream {
                status: 422,
                message: format!("prompt blocked: {}", reason),
            });
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| AiError::Upstream {
            status: 502,
            message: "response contained no candidates".to_string(),
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(AiError::Upstream {
                status: 502,
                message: format!("candidate had no text (finish reason {})", reason),
            });
        }

        Ok(text)
    }
}
