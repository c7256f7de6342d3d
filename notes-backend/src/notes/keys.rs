//! Object key layout. Changing these breaks existing buckets.

use uuid::Uuid;

/// `<userId>/<noteId>.json`
pub fn note_key(user_id: &str, note_id: Uuid) -> String {
    format!("{}/{}.json", user_id, note_id.hyphenated())
}

/// `<userId>/summary.json`
pub fn summary_key(user_id: &str) -> String {
    format!("{}/summary.json", user_id)
}
