use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Message, NewThread, Thread, ThreadQuery, ThreadUpdate};

/// Trait for database persistence operations
///
/// Every call is its own unit of work: it either commits fully or returns an error.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a new, empty thread
    async fn create_thread(&self, new_thread: NewThread) -> Result<Thread>;

    /// Get a thread by ID
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Apply a partial update and bump `updated_at`; fails with `ThreadNotFound`
    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Thread>;

    /// Delete a thread together with all of its messages
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Threads ordered by most recently updated first
    async fn list_threads(&self, query: ThreadQuery) -> Result<Vec<Thread>>;

    /// Append a message; bumps the owning thread's `updated_at`
    async fn save_message(&self, message: Message) -> Result<()>;

    /// Get a message by ID; fails with `MessageNotFound`
    async fn get_message(&self, message_id: &str) -> Result<Message>;

    /// All messages of a thread in chronological order
    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    async fn count_messages(&self, thread_id: &str) -> Result<usize>;
}
