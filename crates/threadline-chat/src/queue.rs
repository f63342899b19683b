use async_trait::async_trait;

use crate::error::Result;

/// Port for out-of-band summarization requests.
///
/// The default implementation only records the request; a real job queue can
/// be plugged in without touching the pipeline.
#[async_trait]
pub trait SummarizationQueue: Send + Sync {
    async fn submit(&self, thread_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct LoggingSummarizationQueue;

impl LoggingSummarizationQueue {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SummarizationQueue for LoggingSummarizationQueue {
    async fn submit(&self, thread_id: &str) -> Result<()> {
        tracing::info!(thread_id, "Summarization requested, no background worker attached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_queue_accepts() {
        let queue = LoggingSummarizationQueue::new();
        assert!(queue.submit("thread-1").await.is_ok());
    }
}
