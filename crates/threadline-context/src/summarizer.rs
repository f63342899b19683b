use std::sync::Arc;

use threadline_llm::{ChatMessage, ModelClient, Role};

use crate::templates::{DEFAULT_TITLE, SUMMARY_PROMPT_TEMPLATE, TITLE_PROMPT_TEMPLATE};

pub const DEFAULT_TITLE_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_SUMMARY_TEMPERATURE: f32 = 0.3;

/// Single-shot title and rolling-summary generation.
///
/// Never fails: an unreachable model or an empty reply degrades to
/// [`DEFAULT_TITLE`] for titles and an empty string for summaries.
#[derive(Clone)]
pub struct TitleSummaryGenerator {
    model: Arc<dyn ModelClient>,
    title_temperature: f32,
    summary_temperature: f32,
}

impl TitleSummaryGenerator {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            title_temperature: DEFAULT_TITLE_TEMPERATURE,
            summary_temperature: DEFAULT_SUMMARY_TEMPERATURE,
        }
    }

    pub fn with_temperatures(mut self, title: f32, summary: f32) -> Self {
        self.title_temperature = title;
        self.summary_temperature = summary;
        self
    }

    pub async fn title(&self, transcript: &str) -> String {
        let prompt = TITLE_PROMPT_TEMPLATE.replace("<transcript>", transcript);
        match self.model.generate_once(&prompt, self.title_temperature).await {
            Ok(raw) => {
                let title = clean_title(&raw);
                if title.is_empty() {
                    tracing::warn!("Title generation returned nothing usable, using fallback");
                    DEFAULT_TITLE.to_string()
                } else {
                    title
                }
            }
            Err(e) => {
                tracing::warn!("Title generation degraded: {}", e);
                DEFAULT_TITLE.to_string()
            }
        }
    }

    pub async fn summary(&self, transcript: &str) -> String {
        let prompt = SUMMARY_PROMPT_TEMPLATE.replace("<transcript>", transcript);
        match self.model.generate_once(&prompt, self.summary_temperature).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("Summary generation degraded: {}", e);
                String::new()
            }
        }
    }
}

/// First line only, without surrounding quotes or trailing punctuation
fn clean_title(raw: &str) -> String {
    let first_line = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    first_line
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '`')
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ':' | ';'))
        .trim()
        .to_string()
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::System => "System",
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

/// Plain-text transcript, one `Speaker: content` line per message
pub fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", speaker(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
