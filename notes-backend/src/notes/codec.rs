//! JSON codecs for persisted notes and summary indexes.
//!
//! Stored objects use PascalCase field names so buckets written by earlier
//! deployments stay readable. These record shapes are private; the rest of the
//! crate only sees [`Note`] and [`NoteSummary`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Note, NoteSummary};

pub const CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record has no note id")]
    MissingNoteId,

    #[error("record has no user id")]
    MissingUserId,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct NoteRecordRef<'a> {
    user_id: &'a str,
    note_id: Uuid,
    title: &'a str,
    content: &'a str,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NoteRecord {
    user_id: Option<String>,
    note_id: Option<Uuid>,
    title: Option<String>,
    content: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRecordRef<'a> {
    user_id: &'a str,
    note_id: Uuid,
    title: &'a str,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRecord {
    user_id: Option<String>,
    note_id: Option<Uuid>,
    title: Option<String>,
    created_at: DateTime<Utc>,
}

/// Encode a note that has already been assigned an id and an owner.
pub fn encode_note(note: &Note) -> Result<Vec<u8>, CodecError> {
    let note_id = note.note_id.ok_or(CodecError::MissingNoteId)?;
    if note.user_id.is_empty() {
        return Err(CodecError::MissingUserId);
    }
    Ok(serde_json::to_vec(&NoteRecordRef {
        user_id: &note.user_id,
        note_id,
        title: &note.title,
        content: &note.content,
        created_at: note.created_at,
    })?)
}

pub fn decode_note(bytes: &[u8]) -> Result<Note, CodecError> {
    let record: NoteRecord = serde_json::from_slice(bytes)?;
    let user_id = record
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or(CodecError::MissingUserId)?;
    let note_id = record.note_id.ok_or(CodecError::MissingNoteId)?;
    Ok(Note {
        user_id,
        note_id: Some(note_id),
        title: record.title.unwrap_or_default(),
        content: record.content.unwrap_or_default(),
        created_at: record.created_at,
    })
}

/// Encode an index in the order given; callers sort before encoding.
pub fn encode_summaries(summaries: &[NoteSummary]) -> Result<Vec<u8>, CodecError> {
    let records: Vec<SummaryRecordRef<'_>> = summaries
        .iter()
        .map(|s| SummaryRecordRef {
            user_id: &s.user_id,
            note_id: s.note_id,
            title: &s.title,
            created_at: s.created_at,
        })
        .collect();
    Ok(serde_json::to_vec(&records)?)
}

pub fn decode_summaries(bytes: &[u8]) -> Result<Vec<NoteSummary>, CodecError> {
    let records: Vec<SummaryRecord> = serde_json::from_slice(bytes)?;
    records
        .into_iter()
        .map(|r| {
            Ok(NoteSummary {
                user_id: r.user_id.unwrap_or_default(),
                note_id: r.note_id.ok_or(CodecError::MissingNoteId)?,
                title: r.title.unwrap_or_default(),
                created_at: r.created_at,
            })
        })
        .collect()
}
