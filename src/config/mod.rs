//! Configuration Module
//!
//! AI settings and the layered loader that fills them in.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{AiConfig, BackoffConfig};
