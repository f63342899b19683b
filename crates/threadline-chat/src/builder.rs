use std::sync::Arc;

use anyhow::{anyhow, Result};
use threadline_context::PromptAssembler;
use threadline_llm::ModelClient;
use threadline_persist::PersistenceClient;

use crate::config::PipelineConfig;
use crate::pipeline::ConversationPipeline;

/// Builder for constructing a ConversationPipeline
pub struct PipelineBuilder {
    persistence: Option<Arc<dyn PersistenceClient>>,
    model: Option<Arc<dyn ModelClient>>,
    assembler: PromptAssembler,
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            persistence: None,
            model: None,
            assembler: PromptAssembler::default(),
            config: PipelineConfig::default(),
        }
    }

    pub fn persistence(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.persistence = Some(client);
        self
    }

    pub fn model(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.model = Some(client);
        self
    }

    /// Defaults to a char/4 estimator with the default budget and no system prompt
    pub fn assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ConversationPipeline> {
        let persistence = self
            .persistence
            .ok_or_else(|| anyhow!("Persistence client is required"))?;
        let model = self.model.ok_or_else(|| anyhow!("Model client is required"))?;

        Ok(ConversationPipeline::new(
            persistence,
            model,
            self.assembler,
            self.config,
        ))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
