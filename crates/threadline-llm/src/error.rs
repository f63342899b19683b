use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// Connection could not be established, or dropped before the completion marker
    #[error("Model server unavailable: {0}")]
    Unavailable(String),

    #[error("Model server returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Model server returned an empty response")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ModelError::Protocol(e.to_string())
        } else {
            ModelError::Unavailable(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
