use async_trait::async_trait;
use notes_events_types::{EventEnvelope, NoteEvent};
use reqwest::Client;
use std::time::Duration;

use super::{EventPublisher, PublishError, PUBLISHER_NAME};

/// Posts events to the notes-events service.
pub struct HttpEventPublisher {
    client: Client,
    endpoint: String,
}

impl HttpEventPublisher {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("[EVENTS] Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self {
            client,
            endpoint: format!("{}/rpc/events", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    async fn publish(&self, event: &NoteEvent) -> Result<(), PublishError> {
        let envelope = EventEnvelope {
            publisher: PUBLISHER_NAME.to_string(),
            event: event.clone(),
        };

        let resp = self.client.post(&self.endpoint).json(&envelope).send().await?;
        if !resp.status().is_success() {
            return Err(PublishError::Rejected(resp.status()));
        }

        log::debug!("[EVENTS] Published {} to {}", event, self.endpoint);
        Ok(())
    }
}
