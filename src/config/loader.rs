//! Configuration Loader
//!
//! Layers configuration from built-in defaults, JSON files and environment
//! variables. Later layers override earlier ones key by key.

use crate::config::settings::AiConfig;
use crate::error::{AiError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Comma-separated API keys
pub const ENV_API_KEYS: &str = "GEMINI_API_KEYS";
/// Legacy single API key
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_MAX_RETRIES: &str = "AI_MAX_RETRIES";
/// Explicit config file path
pub const ENV_CONFIG_PATH: &str = "SCREENLOG_AI_CONFIG";

/// Configuration loader with support for multiple sources
#[derive(Debug)]
pub struct ConfigLoader {
    config: AiConfig,
}

impl ConfigLoader {
    /// Load `.env`, default config paths and the process environment
    pub fn new() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut loader = Self::defaults();
        loader.load_from_default_paths()?;
        loader.apply_env(|name| std::env::var(name).ok())?;
        Ok(loader)
    }

    /// Create a loader with a specific config file, then apply the environment
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut loader = Self::defaults();
        loader.load_from_file(path)?;
        loader.apply_env(|name| std::env::var(name).ok())?;
        Ok(loader)
    }

    /// Built-in defaults only
    pub fn defaults() -> Self {
        Self {
            config: AiConfig::default(),
        }
    }

    /// Load every existing file from the default locations
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }
        Ok(())
    }

    /// Config paths, least specific first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".screenlog-ai").join("config.json"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("screenlog-ai").join("config.json"));
        }

        paths.push(PathBuf::from("screenlog-ai.json"));

        if let Ok(custom_path) = std::env::var(ENV_CONFIG_PATH) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AiError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let overlay: Value = serde_json::from_str(&content).map_err(|e| {
            AiError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        self.merge_value(overlay)
            .map_err(|e| AiError::Config(format!("Invalid settings in {}: {}", path.display(), e)))
    }

    /// Merge a JSON object into the current configuration
    fn merge_value(&mut self, overlay: Value) -> Result<()> {
        let mut base = serde_json::to_value(&self.config)
            .map_err(|e| AiError::Config(e.to_string()))?;
        merge_json(&mut base, overlay);
        self.config = serde_json::from_value(base).map_err(|e| AiError::Config(e.to_string()))?;
        Ok(())
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(keys) = lookup(ENV_API_KEYS) {
            self.config.api_keys = vec![keys];
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.config.api_key = Some(key);
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.config.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.config.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            self.config.max_retries = raw.trim().parse().map_err(|e| {
                AiError::Config(format!("{} must be a non-negative integer: {}", ENV_MAX_RETRIES, e))
            })?;
        }
        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> AiConfig {
        self.config
    }
}

/// Recursively overlay `overlay` onto `base`; non-object values replace
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
