//! Durable [`trashmap_core::KeyValueStore`] backends for the point cache.

mod file;
mod sqlite;

pub use file::FileKeyValueStore;
pub use sqlite::{SqliteKeyValueStore, SqliteStoreError};
