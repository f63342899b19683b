// Ollama-specific client implementation

use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::streaming::parse_chat_stream;
use crate::traits::{FragmentStream, GenerationOptions, ModelClient};
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

/// Ollama client (HTTP direct, no SDK)
pub struct OllamaClient {
    http_client: reqwest::Client,
    config: ModelConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ModelError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn options_payload(options: &GenerationOptions) -> Value {
        let mut payload = json!({
            "num_predict": options.max_tokens,
            "temperature": options.temperature,
            "top_p": options.top_p,
        });
        if let (Some(seed), Some(obj)) = (options.seed, payload.as_object_mut()) {
            obj.insert("seed".to_string(), json!(seed));
        }
        payload
    }

    fn build_chat_request(&self, messages: &[ChatMessage]) -> Value {
        json!({
            "model": self.config.model,
            "messages": messages,
            "stream": true,
            "options": Self::options_payload(&self.config.options),
        })
    }

    fn build_generate_request(&self, prompt: &str, temperature: f32) -> Value {
        json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": Self::options_payload(&self.config.options.with_temperature(temperature)),
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let url = self.config.endpoint(path);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream> {
        let body = self.build_chat_request(&messages);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Opening chat stream"
        );

        let response = self.post("/api/chat", &body).await?;
        Ok(parse_chat_stream(response.bytes_stream()))
    }

    async fn generate_once(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = self.build_generate_request(prompt, temperature);
        let response = self.post("/api/generate", &body).await?;

        let parsed: GenerateResponse = response.json().await?;
        if let Some(error) = parsed.error {
            return Err(ModelError::Protocol(error));
        }

        let text = parsed.response.trim().to_string();
        if text.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        let config = ModelConfig::new("http://localhost:11434", "gemma:2b").with_options(
            GenerationOptions::new()
                .max_tokens(256)
                .temperature(0.6)
                .top_p(0.8)
                .seed(42),
        );
        OllamaClient::new(config).unwrap()
    }

    #[test]
    fn test_chat_request_preserves_order_and_options() {
        let request = client().build_chat_request(&[
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
        ]);

        assert_eq!(request["stream"], true);
        assert_eq!(request["model"], "gemma:2b");
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["content"], "hi");
        assert_eq!(request["options"]["num_predict"], 256);
        assert_eq!(request["options"]["seed"], 42);
    }

    #[test]
    fn test_generate_request_overrides_temperature_only() {
        let request = client().build_generate_request("title please", 0.1);

        assert_eq!(request["stream"], false);
        assert_eq!(request["prompt"], "title please");
        let temperature = request["options"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.1).abs() < 1e-6);
        assert_eq!(request["options"]["num_predict"], 256);
    }

    #[test]
    fn test_seed_omitted_when_unset() {
        let payload = OllamaClient::options_payload(&GenerationOptions::default());
        assert!(payload.get("seed").is_none());
    }
}
