pub mod health;
pub mod messages;
pub mod summarize;
pub mod threads;
