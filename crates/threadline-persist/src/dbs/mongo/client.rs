use async_trait::async_trait;
use mongodb::Client;

use crate::dbs::mongo::models::{MongoMessage, MongoThread};
use crate::dbs::mongo::repositories::{MongoMessageRepository, MongoThreadRepository};
use crate::error::{PersistError, Result};
use crate::models::{Message, NewThread, Thread, ThreadQuery, ThreadUpdate};
use crate::trait_client::PersistenceClient;

pub struct MongoPersistenceClient {
    message_repo: MongoMessageRepository,
    thread_repo: MongoThreadRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            message_repo: MongoMessageRepository::new(&client, database),
            thread_repo: MongoThreadRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_thread(&self, new_thread: NewThread) -> Result<Thread> {
        let thread = Thread::new(new_thread);
        let document: MongoThread = thread.clone().into();
        self.thread_repo.insert(&document).await?;
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.thread_repo.get(thread_id).await?.map(Into::into))
    }

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Thread> {
        self.thread_repo
            .update(thread_id, update)
            .await?
            .map(Into::into)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        // Messages go first so a failed thread delete never leaves orphans behind
        let removed = self.message_repo.delete_for_thread(thread_id).await?;
        if !self.thread_repo.delete(thread_id).await? {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        tracing::debug!(thread_id, messages = removed, "Thread deleted");
        Ok(())
    }

    async fn list_threads(&self, query: ThreadQuery) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.list(&query).await?;
        Ok(threads.into_iter().map(Into::into).collect())
    }

    async fn save_message(&self, message: Message) -> Result<()> {
        if !self.thread_repo.touch(&message.thread_id).await? {
            return Err(PersistError::ThreadNotFound(message.thread_id));
        }
        let document: MongoMessage = message.into();
        self.message_repo.insert(&document).await
    }

    async fn get_message(&self, message_id: &str) -> Result<Message> {
        self.message_repo
            .get(message_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| PersistError::MessageNotFound(message_id.to_string()))
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let messages = self.message_repo.list_for_thread(thread_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn count_messages(&self, thread_id: &str) -> Result<usize> {
        let count = self.message_repo.count_for_thread(thread_id).await?;
        Ok(count as usize)
    }
}

