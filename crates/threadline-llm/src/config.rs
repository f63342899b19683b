// Connection and sampling settings for the model server.
// Built once at startup and handed to the client constructor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::traits::GenerationOptions;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gemma:2b";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub options: GenerationOptions,
    /// Ceiling for a whole request; `None` waits for slow tokens indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<Duration>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            options: GenerationOptions::default(),
            request_timeout: None,
        }
    }
}

impl ModelConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Endpoint URL with any trailing slash on the base removed
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let config = ModelConfig::new("http://localhost:11434/", "llama3");
        assert_eq!(config.endpoint("/api/chat"), "http://localhost:11434/api/chat");
        assert_eq!(config.endpoint("api/generate"), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_defaults_have_no_timeout() {
        let config = ModelConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.request_timeout.is_none());
    }
}
