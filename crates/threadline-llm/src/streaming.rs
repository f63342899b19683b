use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;
use crate::line_buffer::LineBuffer;
use crate::traits::FragmentStream;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental piece of the reply, concatenated in order
    Fragment {
        content: String,
    },

    /// Completion marker; nothing follows it
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        done_reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        eval_count: Option<u32>,
    },
}

/// One NDJSON line of an Ollama `/api/chat` stream
#[derive(Debug, Clone, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub eval_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .filter(|c| !c.is_empty())
    }

    fn into_events(self) -> Result<Vec<StreamEvent>, ModelError> {
        if let Some(error) = self.error {
            return Err(ModelError::Protocol(error));
        }

        let mut events = Vec::with_capacity(2);
        if let Some(content) = self.content() {
            events.push(StreamEvent::Fragment {
                content: content.to_string(),
            });
        }
        if self.done {
            events.push(StreamEvent::Done {
                done_reason: self.done_reason,
                eval_count: self.eval_count,
            });
        }
        Ok(events)
    }
}

enum LineOutcome {
    Events(Vec<StreamEvent>),
    Failed(ModelError),
    Skipped,
}

fn decode_line(line: Result<String, ModelError>) -> LineOutcome {
    let line = match line {
        Ok(line) => line,
        Err(e) => {
            tracing::warn!("Skipping undecodable stream line: {}", e);
            return LineOutcome::Skipped;
        }
    };
    if line.is_empty() {
        return LineOutcome::Skipped;
    }

    match serde_json::from_str::<ChatStreamChunk>(&line) {
        Ok(chunk) => match chunk.into_events() {
            Ok(events) => LineOutcome::Events(events),
            Err(e) => LineOutcome::Failed(e),
        },
        Err(e) => {
            tracing::warn!(line = %line, "Failed to decode stream chunk: {}", e);
            LineOutcome::Skipped
        }
    }
}

/// Turn an NDJSON byte stream into fragment events.
///
/// The returned stream ends right after the first `Done`. If the byte stream
/// breaks or closes before a completion marker, the last item is
/// `Err(ModelError::Unavailable)`.
pub fn parse_chat_stream<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: fmt::Display + Send,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = LineBuffer::with_capacity(4096);
        let mut finished = false;
        let mut failure: Option<ModelError> = None;

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(chunk) => {
                    buffer.extend(chunk.as_ref());

                    while let Some(line) = buffer.next_line() {
                        match decode_line(line) {
                            LineOutcome::Events(events) => {
                                for event in events {
                                    let is_done = matches!(event, StreamEvent::Done { .. });
                                    yield Ok(event);
                                    if is_done {
                                        finished = true;
                                        break 'read;
                                    }
                                }
                            }
                            LineOutcome::Failed(e) => {
                                failure = Some(e);
                                break 'read;
                            }
                            LineOutcome::Skipped => {}
                        }
                    }
                }
                Err(e) => {
                    failure = Some(ModelError::Unavailable(format!("Stream interrupted: {}", e)));
                    break 'read;
                }
            }
        }

        if !finished && failure.is_none() {
            if let Some(line) = buffer.take_remainder() {
                match decode_line(line) {
                    LineOutcome::Events(events) => {
                        for event in events {
                            if matches!(event, StreamEvent::Done { .. }) {
                                finished = true;
                            }
                            yield Ok(event);
                        }
                    }
                    LineOutcome::Failed(e) => failure = Some(e),
                    LineOutcome::Skipped => {}
                }
            }
        }

        if let Some(e) = failure {
            yield Err(e);
        } else if !finished {
            yield Err(ModelError::Unavailable(
                "Stream closed before completion marker".to_string(),
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn collect(chunks: Vec<Result<&'static str, String>>) -> Vec<Result<StreamEvent, ModelError>> {
        let byte_stream = stream::iter(chunks.into_iter().map(|c| c.map(|s| s.as_bytes().to_vec())));
        parse_chat_stream(byte_stream).collect().await
    }

    fn fragment(s: &str) -> StreamEvent {
        StreamEvent::Fragment { content: s.to_string() }
    }

    #[tokio::test]
    async fn test_fragments_then_done() {
        let events = collect(vec![
            Ok("{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n"),
            Ok("{\"message\":{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":false}\n{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\"}\n"),
        ])
        .await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].as_ref().unwrap(), &fragment("Hel"));
        assert_eq!(events[1].as_ref().unwrap(), &fragment("lo"));
        assert!(matches!(
            events[2].as_ref().unwrap(),
            StreamEvent::Done { done_reason: Some(r), .. } if r == "stop"
        ));
    }

    #[tokio::test]
    async fn test_line_split_across_network_chunks() {
        let events = collect(vec![
            Ok("{\"message\":{\"content\":\"ab"),
            Ok("c\"},\"done\":false}\n{\"done\":true}\n"),
        ])
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), &fragment("abc"));
    }

    #[tokio::test]
    async fn test_malformed_line_is_skipped() {
        let events = collect(vec![
            Ok("not json\n"),
            Ok("{\"message\":{\"content\":\"ok\"},\"done\":false}\n{\"done\":true}\n"),
        ])
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), &fragment("ok"));
    }

    #[tokio::test]
    async fn test_close_without_done_is_unavailable() {
        let events = collect(vec![Ok("{\"message\":{\"content\":\"partial\"},\"done\":false}\n")]).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), &fragment("partial"));
        assert!(matches!(events[1], Err(ModelError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_transport_error_mid_stream() {
        let events = collect(vec![
            Ok("{\"message\":{\"content\":\"a\"},\"done\":false}\n"),
            Err("connection reset".to_string()),
        ])
        .await;

        assert_eq!(events.len(), 2);
        match &events[1] {
            Err(ModelError::Unavailable(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_line() {
        let events = collect(vec![Ok("{\"error\":\"model not found\"}\n")]).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(ModelError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_final_line_without_newline() {
        let events = collect(vec![Ok("{\"message\":{\"content\":\"x\"},\"done\":true}")]).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), &fragment("x"));
        assert!(matches!(events[1].as_ref().unwrap(), StreamEvent::Done { .. }));
    }
}
