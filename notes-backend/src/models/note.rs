use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's note. `note_id` is `None` until the note is first saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Owner. Always replaced with the caller's identity before persisting.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub note_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Set once at creation; edits keep the original value.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user_id: String::new(),
            note_id: None,
            title: title.into(),
            content: content.into(),
            created_at: DateTime::<Utc>::default(),
        }
    }
}

/// Listing projection of a [`Note`], one entry per note in the user's index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub user_id: String,
    pub note_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_payload_without_id_or_owner() {
        let note: Note = serde_json::from_str(r#"{"title":"Groceries","content":"milk"}"#).unwrap();
        assert_eq!(note.note_id, None);
        assert!(note.user_id.is_empty());
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk");
    }

    #[test]
    fn test_note_api_field_names() {
        let mut note = Note::new("t", "c");
        note.note_id = Some(Uuid::nil());
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("noteId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("userId").is_some());
    }
}
