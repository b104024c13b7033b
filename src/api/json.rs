//! Tolerant JSON Extraction
//!
//! Model output often wraps JSON in prose or markdown fences. Extraction
//! tries the de-fenced text first, then falls back to the span between the
//! first opener and the last matching closer.
//!
//! The fallback is not a balanced scan: prose containing stray braces after
//! the JSON, or several independent JSON values, produces a span that fails
//! to parse and is reported as an error rather than guessed at.

use crate::error::{AiError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Remove markdown code fences (```` ```json ```` and ```` ``` ````)
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Recover a JSON object or array from free-form model output
pub fn extract_json(text: &str) -> Result<Value> {
    let cleaned = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(cleaned.trim()) {
        return Ok(value);
    }

    let span = json_span(text).ok_or_else(|| AiError::parse("no JSON object or array found", text))?;

    serde_json::from_str::<Value>(span)
        .map_err(|e| AiError::parse(format!("invalid JSON in response ({})", e), text))
}

/// Extract JSON and deserialize it into `T`
pub fn extract_json_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = extract_json(text)?;
    serde_json::from_value(value)
        .map_err(|e| AiError::parse(format!("unexpected JSON shape ({})", e), text))
}

/// Byte span from the first `{` or `[` (whichever comes first) to the last
/// matching closer
fn json_span(text: &str) -> Option<&str> {
    let (open, close) = match (text.find('{'), text.find('[')) {
        (Some(brace), Some(bracket)) if bracket < brace => (bracket, ']'),
        (Some(brace), _) => (brace, '}'),
        (None, Some(bracket)) => (bracket, ']'),
        (None, None) => return None,
    };
    let end = text.rfind(close)?;
    if end < open {
        return None;
    }
    Some(&text[open..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(extract_json("  [1, 2]\n").unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let text = "Sure! ```json\n{\"a\":1}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_json_only() {
        let text = "```json\n{\"tags\": [\"noir\", \"slow-burn\"]}\n```";
        assert_eq!(
            extract_json(text).unwrap(),
            json!({"tags": ["noir", "slow-burn"]})
        );
    }

    #[test]
    fn test_array_inside_prose() {
        assert_eq!(
            extract_json("prefix [1,2,3] suffix").unwrap(),
            json!([1, 2, 3])
        );
    }

    #[test]
    fn test_earliest_opener_wins() {
        let text = r#"Here: {"items": [1, 2]} done"#;
        assert_eq!(extract_json(text).unwrap(), json!({"items": [1, 2]}));

        let text = r#"Here: [{"a": 1}, {"a": 2}] done"#;
        assert_eq!(extract_json(text).unwrap(), json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    fn test_no_json_reports_prefix() {
        let text = format!("I cannot help with that. {}", "z".repeat(200));
        let err = extract_json(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let message = err.to_string();
        let prefix: String = text.chars().take(100).collect();
        assert!(message.contains(&prefix));
        assert!(!message.contains(&text[..101]));
    }

    #[test]
    fn test_stray_closer_after_json_is_an_error() {
        // last-closer fallback spans past the real object
        let err = extract_json(r#"{"a": 1} and then a stray } brace"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_closer_before_opener_is_an_error() {
        let err = extract_json("} oops {").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_extract_as_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Score {
            score: u8,
        }

        let score: Score = extract_json_as("Result: {\"score\": 7}").unwrap();
        assert_eq!(score, Score { score: 7 });

        let err = extract_json_as::<Score>("{\"score\": \"high\"}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
