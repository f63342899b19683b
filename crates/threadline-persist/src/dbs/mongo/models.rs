use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Message, MessageRole, Thread};

/// MongoDB-specific Thread document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// MongoDB-specific Message document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Insertion order tiebreaker; BSON dates only keep milliseconds
    pub sequence: i64,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<Thread> for MongoThread {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            summary: thread.summary,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            summary: thread.summary,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl From<Message> for MongoMessage {
    fn from(msg: Message) -> Self {
        let sequence = msg
            .created_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| msg.created_at.timestamp_micros());
        Self {
            id: msg.id,
            thread_id: msg.thread_id,
            role: msg.role,
            content: msg.content,
            tokens: msg.tokens,
            created_at: msg.created_at,
            sequence,
        }
    }
}

impl From<MongoMessage> for Message {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id,
            thread_id: msg.thread_id,
            role: msg.role,
            content: msg.content,
            tokens: msg.tokens,
            created_at: msg.created_at,
        }
    }
}
