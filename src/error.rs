//! Screenlog AI Error Types
//!
//! Every failure leaving the dispatcher is an [`AiError`]. Each variant maps
//! onto one [`ErrorKind`], an HTTP-style status code, and a user-facing
//! message that is kept separate from the diagnostic `Display` text.

use thiserror::Error;

/// Closed classification of AI failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No clients configured
    ServiceUnavailable,

    /// Account-wide quota used up
    QuotaExhausted,

    /// Credential rejected by the remote API
    Auth,

    /// Per-key throttle
    RateLimited,

    /// Network or server-side failure worth retrying later
    Transient,

    /// Anything the dispatcher must not retry
    Fatal,

    /// Model output could not be turned into the expected JSON
    Parse,

    /// Local misconfiguration
    Config,
}

impl ErrorKind {
    /// Label for logs and stats
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::QuotaExhausted => "quota_exhausted",
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Transient => "transient",
            ErrorKind::Fatal => "fatal",
            ErrorKind::Parse => "parse",
            ErrorKind::Config => "config",
        }
    }
}

/// Main error type for AI operations
#[derive(Debug, Clone, Error)]
pub enum AiError {
    /// The client pool is empty
    #[error("AI service not initialized: no API key configured")]
    NotInitialized,

    /// Account-wide quota exhaustion; rotating keys cannot help
    #[error("AI quota exhausted: {message}")]
    QuotaExhausted { message: String },

    /// Invalid or revoked credential
    #[error("authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// Per-key rate limit
    #[error("rate limited (status {status}): {message}")]
    RateLimited { status: u16, message: String },

    /// Retryable network or upstream failure
    #[error("transient upstream failure (status {status}): {message}")]
    Transient { status: u16, message: String },

    /// Non-retryable upstream failure
    #[error("upstream request failed (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Malformed model output
    #[error("failed to parse AI response: {message}")]
    Parse { message: String },

    /// Configuration errors (invalid JSON, unreadable file, bad header value)
    #[error("configuration error: {0}")]
    Config(String),
}

impl AiError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::NotInitialized => ErrorKind::ServiceUnavailable,
            AiError::QuotaExhausted { .. } => ErrorKind::QuotaExhausted,
            AiError::Auth { .. } => ErrorKind::Auth,
            AiError::RateLimited { .. } => ErrorKind::RateLimited,
            AiError::Transient { .. } => ErrorKind::Transient,
            AiError::Upstream { .. } => ErrorKind::Fatal,
            AiError::Parse { .. } => ErrorKind::Parse,
            AiError::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP-style status code the route layer should answer with
    pub fn status(&self) -> u16 {
        match self {
            AiError::NotInitialized => 503,
            AiError::QuotaExhausted { .. } => 429,
            AiError::Auth { status, .. }
            | AiError::RateLimited { status, .. }
            | AiError::Transient { status, .. }
            | AiError::Upstream { status, .. } => *status,
            AiError::Parse { .. } => 502,
            AiError::Config(_) => 500,
        }
    }

    /// Message safe to show to end users
    pub fn user_message(&self) -> &'static str {
        match self {
            AiError::NotInitialized => {
                "AI features are disabled on this server. Please contact the administrator."
            }
            AiError::QuotaExhausted { .. } => {
                "The AI service has used up its quota for now. Please try again later."
            }
            AiError::Auth { .. } => {
                "The AI service is temporarily unavailable. Please try again later."
            }
            AiError::RateLimited { .. } => {
                "The AI service is busy right now. Please try again in a moment."
            }
            AiError::Transient { .. } => {
                "The AI service is temporarily overloaded. Please try again in a few seconds."
            }
            AiError::Upstream { .. } => "The AI request could not be completed.",
            AiError::Parse { .. } => "The AI service returned an unexpected response. Please try again.",
            AiError::Config(_) => "AI features are misconfigured. Please contact the administrator.",
        }
    }

    /// Build a parse error carrying a prefix of the offending text
    pub fn parse(reason: impl std::fmt::Display, raw: &str) -> Self {
        AiError::Parse {
            message: format!("{}. Response starts with: {}", reason, snippet(raw, 100)),
        }
    }
}

/// Phrases marking account-wide exhaustion rather than a per-key throttle.
const QUOTA_PATTERNS: &[&str] = &[
    "exceeded your current quota",
    "check your plan and billing",
    "billing",
    "quota exhausted",
    "per day",
    "daily limit",
];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "too many requests",
    "resource_exhausted",
    "resource exhausted",
];

const AUTH_PATTERNS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "permission_denied",
    "unauthenticated",
];

const TRANSIENT_PATTERNS: &[&str] = &[
    "timeout",
    "timed out",
    "econnreset",
    "connection",
    "unavailable",
    "overloaded",
    "internal error",
];

/// Map a remote failure onto the closed taxonomy.
///
/// `status` is the upstream HTTP status when one was received; `message` is
/// whatever text the failure carried (error message, status string, body).
pub fn classify(status: Option<u16>, message: &str) -> AiError {
    let lower = message.to_lowercase();
    let mentions = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));
    let message = message.to_string();

    let rate_limit_class = status == Some(429) || mentions(RATE_LIMIT_PATTERNS);
    if rate_limit_class {
        if mentions(QUOTA_PATTERNS) {
            return AiError::QuotaExhausted { message };
        }
        return AiError::RateLimited {
            status: 429,
            message,
        };
    }

    if matches!(status, Some(401) | Some(403)) || mentions(AUTH_PATTERNS) {
        return AiError::Auth {
            status: status.unwrap_or(401),
            message,
        };
    }

    match status {
        Some(code @ (408 | 500 | 502 | 503 | 504)) => AiError::Transient {
            status: code,
            message,
        },
        None if mentions(TRANSIENT_PATTERNS) => AiError::Transient {
            status: 503,
            message,
        },
        Some(code) => AiError::Upstream {
            status: code,
            message,
        },
        None => AiError::Upstream {
            status: 500,
            message,
        },
    }
}

/// First `max` characters of `text`, on a char boundary.
pub(crate) fn snippet(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Transient {
                status: 504,
                message: format!("request timed out: {}", err),
            }
        } else if err.is_connect() {
            AiError::Transient {
                status: 503,
                message: format!("connection failed: {}", err),
            }
        } else if err.is_decode() {
            AiError::Parse {
                message: format!("failed to decode response: {}", err),
            }
        } else {
            let status = err.status().map(|s| s.as_u16());
            classify(status, &err.to_string())
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Parse {
            message: format!("JSON parsing error: {}", err),
        }
    }
}

impl From<std::io::Error> for AiError {
    fn from(err: std::io::Error) -> Self {
        AiError::Config(format!("IO error: {}", err))
    }
}

/// Result type alias for AI operations
pub type Result<T> = std::result::Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quota_exhaustion() {
        let err = classify(
            Some(429),
            "You exceeded your current quota, please check your plan and billing details.",
        );
        assert_eq!(err.kind(), ErrorKind::QuotaExhausted);
        assert_eq!(err.status(), 429);

        let err = classify(None, "RESOURCE_EXHAUSTED: quota exceeded for requests per day");
        assert_eq!(err.kind(), ErrorKind::QuotaExhausted);
    }

    #[test]
    fn test_classify_per_key_rate_limit() {
        let err = classify(
            Some(429),
            "Quota exceeded for metric: generate_content_requests per minute",
        );
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        let err = classify(None, "Too Many Requests");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.status(), 429);
    }

    #[test]
    fn test_classify_auth() {
        assert_eq!(classify(Some(401), "unauthorized").kind(), ErrorKind::Auth);
        assert_eq!(classify(Some(403), "forbidden").kind(), ErrorKind::Auth);

        let err = classify(Some(400), "API key not valid. Please pass a valid API key.");
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_classify_transient() {
        for code in [408, 500, 502, 503, 504] {
            assert_eq!(classify(Some(code), "").kind(), ErrorKind::Transient);
        }
        let err = classify(None, "read ECONNRESET");
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.status(), 503);
        assert_eq!(
            classify(None, "The model is overloaded").kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn test_classify_fatal() {
        let err = classify(Some(400), "Invalid JSON payload received");
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert_eq!(err.status(), 400);

        let err = classify(None, "something odd happened");
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_user_messages_distinguish_disabled_from_overloaded() {
        let disabled = AiError::NotInitialized.user_message();
        let quota = AiError::QuotaExhausted {
            message: String::new(),
        }
        .user_message();
        assert!(disabled.contains("administrator"));
        assert!(quota.contains("try again later"));
        assert_ne!(disabled, quota);
        assert_eq!(AiError::NotInitialized.status(), 503);
    }

    #[test]
    fn test_parse_error_keeps_prefix() {
        let raw = "x".repeat(250);
        let err = AiError::parse("no JSON found", &raw);
        let text = err.to_string();
        assert!(text.contains(&"x".repeat(100)));
        assert!(!text.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        assert_eq!(snippet("héllo", 2), "hé");
        assert_eq!(snippet("abc", 10), "abc");
    }
}
