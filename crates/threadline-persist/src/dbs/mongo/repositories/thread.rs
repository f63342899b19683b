use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{bson::doc, bson::Document, Client, Collection};

use crate::dbs::mongo::models::MongoThread;
use crate::error::Result;
use crate::models::{ThreadQuery, ThreadUpdate};

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn insert(&self, thread: &MongoThread) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    pub async fn get(&self, thread_id: &str) -> Result<Option<MongoThread>> {
        Ok(self.collection.find_one(doc! { "_id": thread_id }).await?)
    }

    /// Returns the updated document, or `None` if the thread does not exist
    pub async fn update(&self, thread_id: &str, update: ThreadUpdate) -> Result<Option<MongoThread>> {
        let mut set = doc! { "updated_at": bson::DateTime::from_chrono(Utc::now()) };
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(summary) = update.summary {
            set.insert("summary", summary);
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": thread_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    /// Bump `updated_at`; returns false if the thread does not exist
    pub async fn touch(&self, thread_id: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": thread_id },
                doc! { "$set": { "updated_at": bson::DateTime::from_chrono(Utc::now()) } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Returns false if nothing was deleted
    pub async fn delete(&self, thread_id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": thread_id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Threads ordered by most recently updated first
    pub async fn list(&self, query: &ThreadQuery) -> Result<Vec<MongoThread>> {
        let mut filter = Document::new();
        if let Some(needle) = &query.title_contains {
            filter.insert(
                "title",
                doc! { "$regex": escape_regex(needle), "$options": "i" },
            );
        }

        let mut find = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .skip(query.skip);
        if let Some(limit) = query.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let threads = find.await?.try_collect().await?;
        Ok(threads)
    }
}

/// Make a user-supplied substring safe to embed in a `$regex`
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_regex;

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b"), "a\\.b");
        assert_eq!(escape_regex("(c++)"), "\\(c\\+\\+\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }
}
