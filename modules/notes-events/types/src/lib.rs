//! Shared types for the notes change-event consumer and its publishers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =====================================================
// Event Types
// =====================================================

/// What happened to a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    NoteCreated,
    NoteEdited,
    NoteViewed,
    NoteDeleted,
    NoteEmailed,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventType::NoteCreated => "note_created",
            EventType::NoteEdited => "note_edited",
            EventType::NoteViewed => "note_viewed",
            EventType::NoteDeleted => "note_deleted",
            EventType::NoteEmailed => "note_emailed",
        };
        f.write_str(s)
    }
}

/// A change to one user's note. Delivery is at-least-once and unordered,
/// so consumers must tolerate duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub event_type: EventType,
    pub user_id: String,
    pub note_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl NoteEvent {
    pub fn new(event_type: EventType, user_id: impl Into<String>, note_id: Uuid) -> Self {
        Self {
            event_type,
            user_id: user_id.into(),
            note_id,
            occurred_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}/{}", self.event_type, self.user_id, self.note_id)
    }
}

// =====================================================
// RPC Request Types
// =====================================================

/// An event as it travels over the wire, tagged with who sent it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Name of the publishing service
    pub publisher: String,
    pub event: NoteEvent,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Consumer health status
#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumerStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub received: u64,
    pub acknowledged: u64,
}
