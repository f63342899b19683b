use crate::error::Result;
use crate::streaming::StreamEvent;
use crate::types::ChatMessage;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Lazy, non-restartable sequence of generation events.
///
/// A healthy stream yields zero or more `StreamEvent::Fragment` items followed by
/// exactly one `StreamEvent::Done`. A stream that fails yields an `Err` as its
/// last item instead of `Done`.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Adapter over the external generation API
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Streaming chat completion using the client's fixed generation options
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream>;

    /// Single-shot, non-streaming generation
    async fn generate_once(&self, prompt: &str, temperature: f32) -> Result<String>;
}

/// Sampling configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
            seed: None,
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same options with a different temperature (used by single-shot calls)
    pub fn with_temperature(&self, temp: f32) -> Self {
        Self {
            temperature: temp,
            ..self.clone()
        }
    }
}
