use std::sync::Arc;

use threadline_chat::{ConversationPipeline, SummarizationQueue};
use threadline_persist::PersistenceClient;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub pipeline: ConversationPipeline,
    pub summarizer: Arc<dyn SummarizationQueue>,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: Arc<dyn PersistenceClient>,
        pipeline: ConversationPipeline,
        summarizer: Arc<dyn SummarizationQueue>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            persist,
            pipeline,
            summarizer,
        }
    }
}
