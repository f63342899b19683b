pub mod config;
pub mod error;
pub mod line_buffer;
pub mod ollama;
pub mod streaming;
pub mod traits;
pub mod types;

pub use config::ModelConfig;
pub use error::ModelError;
pub use ollama::OllamaClient;
pub use streaming::{parse_chat_stream, StreamEvent};
pub use traits::{FragmentStream, GenerationOptions, ModelClient};
pub use types::{ChatMessage, Role};
