pub mod builder;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;

pub use builder::PipelineBuilder;
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{ConversationPipeline, PreparedTurn, TurnOutcome, TurnState, ERROR_FRAGMENT};
pub use queue::{LoggingSummarizationQueue, SummarizationQueue};
