//! Axum route handlers for the notes-events RPC API.

use crate::consumer::ConsumerStats;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use notes_events_types::*;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};

pub struct AppState {
    pub queue: mpsc::Sender<EventEnvelope>,
    pub stats: Arc<ConsumerStats>,
    pub start_time: Instant,
}

// POST /rpc/events
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<EventEnvelope>,
) -> (StatusCode, Json<RpcResponse<()>>) {
    if envelope.event.user_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(RpcResponse::err("event has no user id")),
        );
    }

    log::debug!("[EVENTS] Enqueueing {} from '{}'", envelope.event, envelope.publisher);

    // Count before sending: acknowledged must never pass received
    state.stats.received.fetch_add(1, Ordering::Relaxed);

    match state.queue.try_send(envelope) {
        Ok(()) => (StatusCode::OK, Json(RpcResponse::ok(()))),
        Err(e) => {
            state.stats.received.fetch_sub(1, Ordering::Relaxed);
            let msg = match e {
                TrySendError::Full(envelope) => {
                    log::warn!("[EVENTS] Queue full, rejecting {}", envelope.event);
                    "event queue is full"
                }
                TrySendError::Closed(_) => {
                    log::error!("[EVENTS] Queue closed, rejecting event");
                    "event queue is closed"
                }
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(RpcResponse::err(msg)))
        }
    }
}

// GET /rpc/status
pub async fn status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<RpcResponse<ConsumerStatus>>) {
    // Acknowledged first, so the received count read after it is at least as large
    let acknowledged = state.stats.acknowledged.load(Ordering::Acquire);
    let status = ConsumerStatus {
        running: !state.queue.is_closed(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        received: state.stats.received.load(Ordering::Relaxed),
        acknowledged,
    };

    (StatusCode::OK, Json(RpcResponse::ok(status)))
}
