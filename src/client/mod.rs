//! Client Module
//!
//! The remote generation capability and its HTTP implementation.

pub mod gemini;
#[cfg(test)]
pub(crate) mod mock;

pub use gemini::{GeminiClient, GenerationSettings};

use crate::error::Result;
use std::future::Future;

/// One remote "prompt in, text out" call
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt` with the given model
    fn generate(&self, model: &str, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
