use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use threadline_llm::Role as MessageRole;

/// Database-agnostic message model. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub tokens: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(thread_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            role,
            content: content.into(),
            tokens: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::User, content)
    }

    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::Assistant, content)
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

// Conversion: Message → prompt entry
impl From<&Message> for threadline_llm::ChatMessage {
    fn from(msg: &Message) -> Self {
        threadline_llm::ChatMessage::new(msg.role, msg.content.clone())
    }
}

impl From<Message> for threadline_llm::ChatMessage {
    fn from(msg: Message) -> Self {
        threadline_llm::ChatMessage::new(msg.role, msg.content)
    }
}
