use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{Message, NewThread, Thread, ThreadQuery, ThreadUpdate};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct Store {
    threads: HashMap<String, Thread>,
    /// Per-thread messages in insertion (= chronological) order
    messages: HashMap<String, Vec<Message>>,
    /// message id → owning thread id
    message_index: HashMap<String, String>,
}

/// Process-local backend. Each operation holds the lock for its whole
/// read-modify-write, so single calls are atomic.
#[derive(Default)]
pub struct InMemoryPersistenceClient {
    store: RwLock<Store>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn create_thread(&self, new_thread: NewThread) -> Result<Thread> {
        let thread = Thread::new(new_thread);
        let mut store = self.store.write().await;
        store.messages.insert(thread.id.clone(), Vec::new());
        store.threads.insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let store = self.store.read().await;
        Ok(store.threads.get(thread_id).cloned())
    }

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Thread> {
        let mut store = self.store.write().await;
        let thread = store
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        thread.apply(update, Utc::now());
        Ok(thread.clone())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if store.threads.remove(thread_id).is_none() {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        let removed = store.messages.remove(thread_id).unwrap_or_default();
        for message in &removed {
            store.message_index.remove(&message.id);
        }
        tracing::debug!(thread_id, messages = removed.len(), "Thread deleted");
        Ok(())
    }

    async fn list_threads(&self, query: ThreadQuery) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        let mut threads: Vec<Thread> = store
            .threads
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(threads
            .into_iter()
            .skip(query.skip as usize)
            .take(limit)
            .collect())
    }

    async fn save_message(&self, message: Message) -> Result<()> {
        let mut store = self.store.write().await;
        let thread = store
            .threads
            .get_mut(&message.thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(message.thread_id.clone()))?;
        thread.touch(message.created_at.max(Utc::now()));

        store
            .message_index
            .insert(message.id.clone(), message.thread_id.clone());
        store
            .messages
            .entry(message.thread_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn get_message(&self, message_id: &str) -> Result<Message> {
        let store = self.store.read().await;
        store
            .message_index
            .get(message_id)
            .and_then(|thread_id| store.messages.get(thread_id))
            .and_then(|messages| messages.iter().find(|m| m.id == message_id))
            .cloned()
            .ok_or_else(|| PersistError::MessageNotFound(message_id.to_string()))
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let store = self.store.read().await;
        Ok(store.messages.get(thread_id).cloned().unwrap_or_default())
    }

    async fn count_messages(&self, thread_id: &str) -> Result<usize> {
        let store = self.store.read().await;
        Ok(store.messages.get(thread_id).map(Vec::len).unwrap_or(0))
    }
}
