//! Change-event publishing.
//!
//! Events are a side channel: the note store hands them to [`dispatch`] after
//! its writes have landed and never waits on the outcome. A failed publish is
//! logged and otherwise ignored.

mod http;

pub use http::HttpEventPublisher;
pub use notes_events_types::{EventType, NoteEvent};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Publisher name attached to every outgoing event
pub const PUBLISHER_NAME: &str = "notes-backend";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("consumer rejected event with status {0}")]
    Rejected(reqwest::StatusCode),
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &NoteEvent) -> Result<(), PublishError>;
}

/// Fallback publisher when no consumer is configured: just logs.
#[derive(Debug, Default)]
pub struct LogEventPublisher;

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: &NoteEvent) -> Result<(), PublishError> {
        log::info!("[EVENTS] {}", event);
        Ok(())
    }
}

/// Fire-and-forget publish on a background task.
pub fn dispatch(publisher: &Arc<dyn EventPublisher>, event: NoteEvent) {
    let publisher = Arc::clone(publisher);
    tokio::spawn(async move {
        if let Err(e) = publisher.publish(&event).await {
            log::warn!("[EVENTS] Failed to publish {}: {}", event, e);
        }
    });
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_dispatch_delivers_in_background() {
        let (publisher, mut log) = RecordingPublisher::channel();
        let id = Uuid::new_v4();

        dispatch(&publisher, NoteEvent::new(EventType::NoteEdited, "alice", id));

        let event = log.next().await;
        assert_eq!(event.event_type, EventType::NoteEdited);
        assert_eq!(event.note_id, id);
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let publisher: Arc<dyn EventPublisher> = Arc::new(FailingPublisher);
        dispatch(&publisher, NoteEvent::new(EventType::NoteDeleted, "alice", Uuid::new_v4()));
        tokio::task::yield_now().await;
    }
}
