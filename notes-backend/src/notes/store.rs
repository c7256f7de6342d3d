//! NoteStore: note records and summary index on top of an object store
//!
//! Every note lives at its own key. Each user also has a summary index, a
//! single JSON array of lightweight projections ordered newest first, which
//! is read, modified and rewritten wholesale on every create, edit and delete.
//! The object store has no multi-key transactions, so the record and the index
//! are written one after the other: the record first, then the index.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::codec::{self, CodecError, CONTENT_TYPE};
use super::keys::{note_key, summary_key};
use super::user_locks::{IndexWriteMode, UserLockGuard, UserLocks};
use crate::events::{self, EventPublisher, EventType, NoteEvent};
use crate::models::{Note, NoteSummary};
use crate::object_store::{ObjectStore, ObjectStoreError};

#[derive(Debug, Error)]
pub enum NoteStoreError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("note {0} not found")]
    NotFound(Uuid),

    #[error("object store failure: {0}")]
    Store(#[from] ObjectStoreError),

    #[error("corrupt object at {key}: {source}")]
    Format { key: String, source: CodecError },
}

/// Outcome of a successful [`NoteStore::save`]
#[derive(Debug, Clone)]
pub struct SavedNote {
    pub note: Note,
    pub event_type: EventType,
}

enum IndexChange {
    Upsert(NoteSummary),
    Remove(Uuid),
}

pub struct NoteStore {
    objects: Arc<dyn ObjectStore>,
    publisher: Arc<dyn EventPublisher>,
    locks: Option<UserLocks>,
}

impl NoteStore {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        publisher: Arc<dyn EventPublisher>,
        mode: IndexWriteMode,
    ) -> Self {
        let locks = match mode {
            IndexWriteMode::PerUserLock => Some(UserLocks::new()),
            IndexWriteMode::Unguarded => None,
        };
        Self {
            objects,
            publisher,
            locks,
        }
    }

    /// Fetch one note. `Ok(None)` if it does not exist.
    pub async fn get(&self, user_id: &str, note_id: Uuid) -> Result<Option<Note>, NoteStoreError> {
        validate_user_id(user_id)?;
        self.read_note(user_id, note_id).await
    }

    /// The user's summary index, newest first. Empty if the user has no notes.
    pub async fn list(&self, user_id: &str) -> Result<Vec<NoteSummary>, NoteStoreError> {
        validate_user_id(user_id)?;
        let mut summaries = self
            .read_object(&summary_key(user_id), codec::decode_summaries)
            .await?
            .unwrap_or_default();
        retain_owned(&mut summaries, user_id);
        Ok(summaries)
    }

    /// Create or edit a note owned by `user_id`.
    ///
    /// Whatever owner the payload claims is replaced with `user_id`. A note
    /// without an id is created with a fresh id and creation time. A note with
    /// an id must already exist; its original creation time is kept.
    pub async fn save(&self, user_id: &str, mut note: Note) -> Result<SavedNote, NoteStoreError> {
        validate_user_id(user_id)?;
        note.user_id = user_id.to_string();

        let _guard = self.lock_user(user_id).await;

        let (note_id, event_type) = match note.note_id {
            None => {
                let id = Uuid::new_v4();
                note.note_id = Some(id);
                note.created_at = Utc::now();
                log::debug!("[NOTES] Creating note {} for user \"{}\"", id, user_id);
                (id, EventType::NoteCreated)
            }
            Some(id) => {
                let existing = self
                    .read_note(user_id, id)
                    .await?
                    .ok_or(NoteStoreError::NotFound(id))?;
                note.created_at = existing.created_at;
                log::debug!("[NOTES] Editing note {} for user \"{}\"", id, user_id);
                (id, EventType::NoteEdited)
            }
        };

        let key = note_key(user_id, note_id);
        let bytes = codec::encode_note(&note).map_err(|source| NoteStoreError::Format {
            key: key.clone(),
            source,
        })?;
        self.write_object(&key, bytes).await?;

        self.rewrite_index(
            user_id,
            IndexChange::Upsert(NoteSummary {
                user_id: note.user_id.clone(),
                note_id,
                title: note.title.clone(),
                created_at: note.created_at,
            }),
        )
        .await?;

        events::dispatch(&self.publisher, NoteEvent::new(event_type, user_id, note_id));

        Ok(SavedNote { note, event_type })
    }

    /// Delete a note and its index entry. Returns `false` if there was no
    /// such note, in which case nothing is written.
    ///
    /// The existence check only gives the caller an accurate answer; another
    /// writer can still create or remove the record between the check and the
    /// delete.
    pub async fn delete(&self, user_id: &str, note_id: Uuid) -> Result<bool, NoteStoreError> {
        validate_user_id(user_id)?;

        let _guard = self.lock_user(user_id).await;

        if self.read_note(user_id, note_id).await?.is_none() {
            log::debug!(
                "[NOTES] Note {} for user \"{}\" not found, nothing to delete",
                note_id,
                user_id
            );
            return Ok(false);
        }

        let key = note_key(user_id, note_id);
        log::debug!("[NOTES] Deleting note {} for user \"{}\"", note_id, user_id);
        self.objects.delete(&key).await.map_err(|e| store_failure(&key, e))?;

        self.rewrite_index(user_id, IndexChange::Remove(note_id)).await?;

        events::dispatch(
            &self.publisher,
            NoteEvent::new(EventType::NoteDeleted, user_id, note_id),
        );

        Ok(true)
    }

    async fn lock_user(&self, user_id: &str) -> Option<UserLockGuard<'_>> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(user_id).await),
            None => None,
        }
    }

    async fn read_note(&self, user_id: &str, note_id: Uuid) -> Result<Option<Note>, NoteStoreError> {
        self.read_object(&note_key(user_id, note_id), codec::decode_note)
            .await
    }

    /// Read-modify-write of the user's summary index.
    async fn rewrite_index(&self, user_id: &str, change: IndexChange) -> Result<(), NoteStoreError> {
        let key = summary_key(user_id);
        let mut summaries = self
            .read_object(&key, codec::decode_summaries)
            .await?
            .unwrap_or_default();

        retain_owned(&mut summaries, user_id);

        match change {
            IndexChange::Upsert(summary) => {
                summaries.retain(|s| s.note_id != summary.note_id);
                summaries.push(summary);
            }
            IndexChange::Remove(note_id) => {
                summaries.retain(|s| s.note_id != note_id);
            }
        }

        // Stable sort: equal timestamps keep insertion order
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        log::trace!(
            "[NOTES] Writing index of user \"{}\" with {} entries",
            user_id,
            summaries.len()
        );
        let bytes = codec::encode_summaries(&summaries).map_err(|source| NoteStoreError::Format {
            key: key.clone(),
            source,
        })?;
        self.write_object(&key, bytes).await
    }

    async fn read_object<T>(
        &self,
        key: &str,
        decode: fn(&[u8]) -> Result<T, CodecError>,
    ) -> Result<Option<T>, NoteStoreError> {
        let Some(bytes) = self.objects.get(key).await.map_err(|e| store_failure(key, e))? else {
            return Ok(None);
        };
        match decode(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                log::error!("[NOTES] Corrupt object at {}: {}", key, source);
                Err(NoteStoreError::Format {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    async fn write_object(&self, key: &str, bytes: Vec<u8>) -> Result<(), NoteStoreError> {
        self.objects
            .put(key, bytes, CONTENT_TYPE)
            .await
            .map_err(|e| store_failure(key, e))
    }
}

/// Drop index entries that belong to someone else.
fn retain_owned(summaries: &mut Vec<NoteSummary>, user_id: &str) {
    let before = summaries.len();
    summaries.retain(|s| s.user_id == user_id);
    if summaries.len() != before {
        log::warn!(
            "[NOTES] Dropped {} foreign entries from index of user \"{}\"",
            before - summaries.len(),
            user_id
        );
    }
}

fn store_failure(key: &str, e: ObjectStoreError) -> NoteStoreError {
    log::error!("[NOTES] Object store failure on {}: {}", key, e);
    NoteStoreError::Store(e)
}

fn validate_user_id(user_id: &str) -> Result<(), NoteStoreError> {
    if user_id.trim().is_empty() {
        return Err(NoteStoreError::Validation("user id is empty".to_string()));
    }
    if user_id.contains(['/', '\\']) || user_id == "." || user_id == ".." {
        return Err(NoteStoreError::Validation(format!(
            "user id \"{}\" is not a valid key prefix",
            user_id
        )));
    }
    Ok(())
}
