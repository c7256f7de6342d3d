//! Background poller that drains published note events.
//!
//! Events are queued by the RPC handler and picked up here in batches. Each
//! message is logged and then acknowledged; nothing else is done with it yet.

use notes_events_types::EventEnvelope;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Counters shared between the RPC handlers and the poller
#[derive(Debug, Default)]
pub struct ConsumerStats {
    pub received: AtomicU64,
    pub acknowledged: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub max_batch: usize,
}

/// Create the queue the RPC handlers push into and the poller reads from.
/// Holds at most `capacity` unpolled events; publishers are turned away
/// once it is full.
pub fn queue(capacity: usize) -> (mpsc::Sender<EventEnvelope>, mpsc::Receiver<EventEnvelope>) {
    mpsc::channel(capacity.max(1))
}

/// Poll the queue until every sender is gone and the backlog is drained.
pub async fn run_poller(
    mut rx: mpsc::Receiver<EventEnvelope>,
    stats: Arc<ConsumerStats>,
    config: PollerConfig,
) {
    log::info!(
        "[EVENTS] Poller started (interval {:?}, batch {})",
        config.poll_interval,
        config.max_batch
    );

    let max_batch = config.max_batch.max(1);
    let mut batch = Vec::with_capacity(max_batch);
    loop {
        log::debug!("[EVENTS] Polling for messages");
        let count = rx.recv_many(&mut batch, max_batch).await;
        if count == 0 {
            break;
        }

        for envelope in batch.drain(..) {
            log::info!(
                "[EVENTS] Received {} from '{}'",
                envelope.event,
                envelope.publisher
            );
            acknowledge(&stats, &envelope);
        }

        tokio::time::sleep(config.poll_interval).await;
    }

    log::info!("[EVENTS] Poller stopped");
}

fn acknowledge(stats: &ConsumerStats, envelope: &EventEnvelope) {
    stats.acknowledged.fetch_add(1, Ordering::Release);
    log::debug!("[EVENTS] Acknowledged {}", envelope.event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_events_types::{EventType, NoteEvent};
    use uuid::Uuid;

    fn envelope(event_type: EventType) -> EventEnvelope {
        EventEnvelope {
            publisher: "test".to_string(),
            event: NoteEvent::new(event_type, "alice", Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn test_poller_acknowledges_every_message() {
        let (tx, rx) = queue(8);
        let stats = Arc::new(ConsumerStats::default());
        let config = PollerConfig {
            poll_interval: Duration::from_millis(1),
            max_batch: 2,
        };

        for event_type in [EventType::NoteCreated, EventType::NoteEdited, EventType::NoteDeleted] {
            tx.try_send(envelope(event_type)).unwrap();
        }
        drop(tx);

        run_poller(rx, stats.clone(), config).await;

        assert_eq!(stats.acknowledged.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_poller_stops_on_empty_closed_queue() {
        let (tx, rx) = queue(8);
        drop(tx);
        let stats = Arc::new(ConsumerStats::default());
        let config = PollerConfig {
            poll_interval: Duration::from_millis(1),
            max_batch: 0,
        };

        run_poller(rx, stats.clone(), config).await;

        assert_eq!(stats.acknowledged.load(Ordering::Relaxed), 0);
    }
}
