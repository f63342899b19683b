use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use threadline_context::{TitleSummaryGenerator, DEFAULT_TITLE};
use threadline_llm::{ChatMessage, FragmentStream, ModelClient, ModelError};

/// Replies to every single-shot call with the same canned result
struct CannedModel {
    reply: Option<String>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl CannedModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelClient for CannedModel {
    async fn stream_chat(&self, _messages: Vec<ChatMessage>) -> Result<FragmentStream, ModelError> {
        Err(ModelError::Unavailable("not used".to_string()))
    }

    async fn generate_once(&self, prompt: &str, temperature: f32) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push((prompt.to_string(), temperature));
        self.reply
            .clone()
            .ok_or_else(|| ModelError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_title_uses_transcript_and_low_temperature() {
    let model = Arc::new(CannedModel::replying("Sourdough Baking."));
    let generator = TitleSummaryGenerator::new(model.clone());

    let title = generator.title("User: how do I bake bread?\nAssistant: start with flour").await;

    assert_eq!(title, "Sourdough Baking");
    let calls = model.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("how do I bake bread?"));
    assert!(calls[0].0.contains("1 to 3 words"));
}

#[tokio::test]
async fn test_title_falls_back_on_failure() {
    let generator = TitleSummaryGenerator::new(Arc::new(CannedModel::failing()));
    assert_eq!(generator.title("User: hi").await, DEFAULT_TITLE);
}

#[tokio::test]
async fn test_title_falls_back_on_punctuation_only_reply() {
    let generator = TitleSummaryGenerator::new(Arc::new(CannedModel::replying("\"...\"")));
    assert_eq!(generator.title("User: hi").await, DEFAULT_TITLE);
}

#[tokio::test]
async fn test_summary_falls_back_to_empty() {
    let generator = TitleSummaryGenerator::new(Arc::new(CannedModel::failing()));
    assert_eq!(generator.summary("User: hi").await, "");
}

#[tokio::test]
async fn test_summary_temperature_above_title_temperature() {
    let model = Arc::new(CannedModel::replying("- goal: learn rust\n"));
    let generator = TitleSummaryGenerator::new(model.clone());

    let summary = generator.summary("User: teach me rust").await;
    generator.title("User: teach me rust").await;

    assert_eq!(summary, "- goal: learn rust");
    let calls = model.calls.lock().unwrap();
    assert!(calls[0].0.contains("at most 10 bullet points"));
    assert!(calls[0].1 > calls[1].1);
}
