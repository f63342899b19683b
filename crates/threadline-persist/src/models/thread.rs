use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THREAD_TITLE: &str = "Untitled";

/// Database-agnostic thread model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(new_thread: NewThread) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: new_thread
                .title
                .unwrap_or_else(|| DEFAULT_THREAD_TITLE.to_string()),
            summary: new_thread.summary,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply provided fields and bump `updated_at`
    pub fn apply(&mut self, update: ThreadUpdate, at: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(summary) = update.summary {
            self.summary = Some(summary);
        }
        self.touch(at);
    }

    /// `updated_at` never moves before `created_at`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at.max(self.created_at);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewThread {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ThreadUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            summary: None,
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            title: None,
            summary: Some(summary.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.summary.is_none()
    }
}

/// Listing parameters: optional case-insensitive title filter plus paging
#[derive(Debug, Clone, Default)]
pub struct ThreadQuery {
    pub title_contains: Option<String>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl ThreadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.title_contains = if needle.is_empty() { None } else { Some(needle) };
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, thread: &Thread) -> bool {
        match &self.title_contains {
            Some(needle) => thread.title.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
