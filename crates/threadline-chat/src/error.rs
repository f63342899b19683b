use thiserror::Error;
use threadline_persist::PersistError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Thread not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[source] PersistError),
}

impl From<PersistError> for PipelineError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::ThreadNotFound(id) | PersistError::MessageNotFound(id) => Self::NotFound(id),
            other => Self::PersistenceFailure(other),
        }
    }
}

impl PipelineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
