use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use threadline_context::{transcript, PromptAssembler, TitleSummaryGenerator};
use threadline_llm::{ChatMessage, ModelClient, StreamEvent};
use threadline_persist::{Message, PersistenceClient, Thread, ThreadUpdate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

/// Terminal fragment sent to the caller when generation fails mid-stream
pub const ERROR_FRAGMENT: &str = "Error: Could not process response.";

/// Lifecycle of one inbound turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Received,
    UserPersisted,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::UserPersisted => "user_persisted",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A turn whose user message is committed and whose prompt is assembled
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub thread: Thread,
    pub user_message: Message,
    pub prompt: Vec<ChatMessage>,
}

impl PreparedTurn {
    pub fn thread_id(&self) -> &str {
        &self.thread.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed {
        message_id: String,
        fragments: usize,
        title_updated: bool,
        summary_updated: bool,
    },
    Failed {
        reason: String,
    },
    /// The caller went away before the reply finished; nothing was persisted
    Cancelled {
        fragments: usize,
    },
}

impl TurnOutcome {
    pub fn state(&self) -> TurnState {
        match self {
            Self::Completed { .. } => TurnState::Completed,
            Self::Failed { .. } => TurnState::Failed,
            Self::Cancelled { .. } => TurnState::Cancelled,
        }
    }
}

struct Finalized {
    message_id: String,
    title_updated: bool,
    summary_updated: bool,
}

/// Drives one user turn from persisted input to a persisted reply.
///
/// Cheap to clone; every clone shares the same collaborators. Turns on the
/// same thread are not serialized against each other.
#[derive(Clone)]
pub struct ConversationPipeline {
    persistence: Arc<dyn PersistenceClient>,
    model: Arc<dyn ModelClient>,
    assembler: Arc<PromptAssembler>,
    generator: TitleSummaryGenerator,
    config: PipelineConfig,
}

impl ConversationPipeline {
    pub fn new(
        persistence: Arc<dyn PersistenceClient>,
        model: Arc<dyn ModelClient>,
        assembler: PromptAssembler,
        config: PipelineConfig,
    ) -> Self {
        let generator = TitleSummaryGenerator::new(Arc::clone(&model))
            .with_temperatures(config.title_temperature, config.summary_temperature);
        Self {
            persistence,
            model,
            assembler: Arc::new(assembler),
            generator,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::PipelineBuilder {
        crate::builder::PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceClient> {
        &self.persistence
    }

    /// Commit the user message and assemble the prompt.
    ///
    /// Runs before any model call, so a failure here aborts the request and a
    /// success guarantees the user's input is stored.
    pub async fn begin_turn(&self, thread_id: &str, content: &str) -> Result<PreparedTurn> {
        tracing::debug!(thread_id, state = %TurnState::Received, "Turn received");

        let thread = self
            .persistence
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(thread_id.to_string()))?;

        let user_message = Message::user(thread_id, content).with_tokens(self.estimate(content));
        self.persistence.save_message(user_message.clone()).await?;
        tracing::debug!(
            thread_id,
            message_id = %user_message.id,
            state = %TurnState::UserPersisted,
            "User message persisted"
        );

        let history: Vec<ChatMessage> = self
            .persistence
            .get_messages(thread_id)
            .await?
            .iter()
            .map(ChatMessage::from)
            .collect();
        let prompt = self.assembler.build(&history, thread.summary.as_deref());
        tracing::debug!(
            thread_id,
            history = history.len(),
            prompt = prompt.len(),
            "Prompt assembled"
        );

        Ok(PreparedTurn {
            thread,
            user_message,
            prompt,
        })
    }

    /// Stream the reply for a prepared turn into `tx`, then finalize.
    ///
    /// `tx` is dropped as soon as the model signals completion, so the
    /// caller's stream ends before title and summary generation start.
    /// Never returns an error: failures are reported in-band to the caller and
    /// summarized in the returned outcome.
    pub async fn stream_turn(&self, turn: PreparedTurn, tx: mpsc::Sender<String>) -> TurnOutcome {
        let thread_id = turn.thread.id.clone();
        tracing::debug!(thread_id = %thread_id, state = %TurnState::Streaming, "Streaming reply");

        let mut stream = match self.model.stream_chat(turn.prompt).await {
            Ok(stream) => stream,
            Err(e) => return fail(&tx, &thread_id, e.to_string()).await,
        };

        let mut reply = String::new();
        let mut fragments = 0usize;
        let mut completed = false;

        loop {
            let next = tokio::select! {
                _ = tx.closed() => return cancelled(&thread_id, fragments),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Fragment { content })) => {
                    if content.is_empty() {
                        continue;
                    }
                    reply.push_str(&content);
                    fragments += 1;
                    if tx.send(content).await.is_err() {
                        return cancelled(&thread_id, fragments);
                    }
                }
                Some(Ok(StreamEvent::Done {
                    done_reason,
                    eval_count,
                })) => {
                    tracing::debug!(
                        thread_id = %thread_id,
                        fragments,
                        done_reason = done_reason.as_deref().unwrap_or("unknown"),
                        eval_count,
                        "Model signalled completion"
                    );
                    completed = true;
                    break;
                }
                Some(Err(e)) => return fail(&tx, &thread_id, e.to_string()).await,
                None => break,
            }
        }

        if !completed {
            return fail(&tx, &thread_id, "stream ended without completion".to_string()).await;
        }
        drop(tx);

        match self
            .finalize(&thread_id, &turn.user_message.content, reply)
            .await
        {
            Ok(done) => {
                tracing::info!(
                    thread_id = %thread_id,
                    message_id = %done.message_id,
                    fragments,
                    title_updated = done.title_updated,
                    summary_updated = done.summary_updated,
                    state = %TurnState::Completed,
                    "Turn completed"
                );
                TurnOutcome::Completed {
                    message_id: done.message_id,
                    fragments,
                    title_updated: done.title_updated,
                    summary_updated: done.summary_updated,
                }
            }
            Err(e) => {
                // The reply already reached the caller, so no in-band marker here
                tracing::error!(
                    thread_id = %thread_id,
                    error = %e,
                    state = %TurnState::Failed,
                    "Failed to commit assistant reply"
                );
                TurnOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Spawn `stream_turn` in the background and hand back the fragment receiver.
    ///
    /// The channel holds one fragment, so generation advances only as fast as
    /// the receiver drains it. Dropping the receiver cancels the turn.
    pub fn spawn_turn(&self, turn: PreparedTurn) -> (mpsc::Receiver<String>, JoinHandle<TurnOutcome>) {
        let (tx, rx) = mpsc::channel(1);
        let pipeline = self.clone();

        let handle = tokio::spawn(async move { pipeline.stream_turn(turn, tx).await });

        (rx, handle)
    }

    /// `begin_turn` followed by `spawn_turn`
    pub async fn run_turn(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<(mpsc::Receiver<String>, JoinHandle<TurnOutcome>)> {
        let turn = self.begin_turn(thread_id, content).await?;
        Ok(self.spawn_turn(turn))
    }

    async fn finalize(&self, thread_id: &str, user_content: &str, reply: String) -> Result<Finalized> {
        let prior = self.persistence.count_messages(thread_id).await?;

        let tokens = self.estimate(&reply);
        let assistant = Message::assistant(thread_id, reply).with_tokens(tokens);
        let message_id = assistant.id.clone();
        let reply_text = assistant.content.clone();
        self.persistence.save_message(assistant).await?;

        let mut update = ThreadUpdate::default();

        if prior == 1 {
            let opening = transcript(&[
                ChatMessage::user(user_content),
                ChatMessage::assistant(reply_text),
            ]);
            update.title = Some(self.generator.title(&opening).await);
        }

        if self.config.summary_due(prior + 1) {
            let history: Vec<ChatMessage> = self
                .persistence
                .get_messages(thread_id)
                .await?
                .iter()
                .map(ChatMessage::from)
                .collect();
            update.summary = Some(self.generator.summary(&transcript(&history)).await);
        }

        let title_updated = update.title.is_some();
        let summary_updated = update.summary.is_some();

        // An empty update still refreshes updated_at
        self.persistence.update_thread(thread_id, update).await?;

        Ok(Finalized {
            message_id,
            title_updated,
            summary_updated,
        })
    }

    fn estimate(&self, text: &str) -> u32 {
        u32::try_from(self.assembler.estimator().estimate(text)).unwrap_or(u32::MAX)
    }
}

async fn fail(tx: &mpsc::Sender<String>, thread_id: &str, reason: String) -> TurnOutcome {
    tracing::warn!(
        thread_id,
        reason = %reason,
        state = %TurnState::Failed,
        "Generation failed, partial reply discarded"
    );
    let _ = tx.send(ERROR_FRAGMENT.to_string()).await;
    TurnOutcome::Failed { reason }
}

fn cancelled(thread_id: &str, fragments: usize) -> TurnOutcome {
    tracing::info!(
        thread_id,
        fragments,
        state = %TurnState::Cancelled,
        "Caller disconnected, abandoning turn"
    );
    TurnOutcome::Cancelled { fragments }
}
