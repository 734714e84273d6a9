//! Runtime configuration for the chat session

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AnalysisError;

/// Environment variable consulted for the API credential when the config
/// file does not carry one.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Settings loaded from a TOML file, all optional except that an API key
/// must be resolvable (file or environment) before the first analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Gemini API key; falls back to the `GEMINI_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent to the generateContent endpoint.
    #[serde(default = "default_model")]
    pub model: String,

    /// Optional pass-through relay prefix for remote sheet fetches, e.g.
    /// `https://corsproxy.io/?`. The export URL is percent-encoded and
    /// appended to it.
    #[serde(default)]
    pub relay_url: Option<String>,

    /// Timeout for each HTTP request (fetch or analysis), in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            relay_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ChatConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ChatConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// API key from the file, or from the environment.
    pub fn resolve_api_key(&self) -> Result<String, AnalysisError> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(AnalysisError::new(format!(
                "no API key: set api_key in the config file or {}",
                API_KEY_ENV
            ))),
        }
    }
}
