mod message;
mod thread;

pub use message::{Message, MessageRole};
pub use thread::{NewThread, Thread, ThreadQuery, ThreadUpdate, DEFAULT_THREAD_TITLE};
