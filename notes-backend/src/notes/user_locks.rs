//! Single-writer-per-user serialization for index updates.
//!
//! The summary index is rewritten wholesale on every mutation, so two
//! concurrent mutations for the same user would otherwise race and the later
//! index write would drop the earlier one's entry. Holding a per-user async
//! mutex across the whole mutation orders them. This only covers writers in
//! this process.

use dashmap::DashMap;
use std::sync::Arc;
use strum::{Display, EnumString};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IndexWriteMode {
    /// Serialize mutations per user
    #[default]
    PerUserLock,
    /// Plain read-modify-write; concurrent mutations for one user can lose
    /// index entries
    Unguarded,
}

#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mutation for `user_id` is running.
    pub async fn acquire(&self, user_id: &str) -> UserLockGuard<'_> {
        let lock = self.locks.entry(user_id.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        UserLockGuard {
            locks: self,
            user_id: user_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of users with a live lock entry.
    #[cfg(test)]
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }
}

pub struct UserLockGuard<'a> {
    locks: &'a UserLocks,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        // Release first so the entry's only remaining owner is the map
        self.guard.take();
        self.locks
            .locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
