//! Notes system: per-user note records plus a denormalized summary index,
//! both kept in an object store.

pub mod codec;
pub mod keys;
pub mod store;
pub mod user_locks;

pub use store::{NoteStore, NoteStoreError, SavedNote};
pub use user_locks::IndexWriteMode;
