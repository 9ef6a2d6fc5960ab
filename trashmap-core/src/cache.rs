//! Durable snapshot of the last successfully fetched point set.
//!
//! The cache is a single namespaced slot inside a [`KeyValueStore`]. Reads
//! fail soft: a missing or malformed entry behaves like an empty cache.
//! Writes are best-effort: failures are logged and never reach the caller,
//! so a broken disk cannot stop live data from being displayed.

use std::error::Error as StdError;

use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;

use crate::Point;

/// Key under which the point snapshot is persisted.
pub const POINT_CACHE_KEY: &str = "pontos_cache";

/// Boxed error reported by a storage backend.
pub type BackendError = Box<dyn StdError + Send + Sync>;

/// Failure reported by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum KeyValueError {
    /// Reading the key failed.
    #[error("failed to read key {key:?}: {source}")]
    Read {
        key: String,
        #[source]
        source: BackendError,
    },
    /// Writing the key failed.
    #[error("failed to write key {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: BackendError,
    },
}

/// String-keyed durable storage.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::collections::HashMap;
/// use async_trait::async_trait;
/// use trashmap_core::{KeyValueError, KeyValueStore};
///
/// #[derive(Default)]
/// struct MapStore(RefCell<HashMap<String, String>>);
///
/// #[async_trait(?Send)]
/// impl KeyValueStore for MapStore {
///     async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
///         Ok(self.0.borrow().get(key).cloned())
///     }
///
///     async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
///         self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
///         Ok(())
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Return the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError>;
    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError>;
}

/// Errors surfaced by [`PointCache::try_load`] and [`PointCache::try_save`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The stored snapshot was not a JSON array of points.
    #[error("cached snapshot under {key:?} is corrupt: {source}")]
    ReadCorrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The snapshot could not be serialised.
    #[error("failed to encode point snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] KeyValueError),
}

/// Single-slot cache of the last remote point set.
pub struct PointCache {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for PointCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointCache")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PointCache {
    /// Cache points under [`POINT_CACHE_KEY`].
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(store, POINT_CACHE_KEY)
    }

    /// Cache points under a custom key.
    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Namespace key of the snapshot.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the snapshot, treating every failure as a cache miss.
    pub async fn load(&self) -> Option<Vec<Point>> {
        match self.try_load().await {
            Ok(points) => points,
            Err(err) => {
                warn!("ignoring point cache: {err}");
                None
            }
        }
    }

    /// Persist `points`, logging rather than returning failures.
    pub async fn save(&self, points: &[Point]) {
        match self.try_save(points).await {
            Ok(()) => debug!("cached {} points under {:?}", points.len(), self.key),
            Err(err) => warn!("failed to update point cache: {err}"),
        }
    }

    /// Read the snapshot, reporting why it could not be used.
    pub async fn try_load(&self) -> Result<Option<Vec<Point>>, CacheError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::ReadCorrupt {
                key: self.key.clone(),
                source,
            })
    }

    /// Persist `points`, reporting failures.
    pub async fn try_save(&self, points: &[Point]) -> Result<(), CacheError> {
        let payload = serde_json::to_string(points).map_err(CacheError::Encode)?;
        self.store.set(&self.key, &payload).await?;
        Ok(())
    }
}
