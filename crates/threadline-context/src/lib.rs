mod assembler;
mod estimator;
mod summarizer;
mod templates;

pub use assembler::{PromptAssembler, DEFAULT_CONTEXT_BUDGET};
pub use estimator::{CharRatioEstimator, TokenEstimator};
#[cfg(feature = "tiktoken")]
pub use estimator::TiktokenEstimator;
pub use summarizer::{
    transcript, TitleSummaryGenerator, DEFAULT_SUMMARY_TEMPERATURE, DEFAULT_TITLE_TEMPERATURE,
};
pub use templates::{
    DEFAULT_TITLE, SUMMARY_CONTEXT_PREFIX, SUMMARY_PROMPT_TEMPLATE, TITLE_PROMPT_TEMPLATE,
};
