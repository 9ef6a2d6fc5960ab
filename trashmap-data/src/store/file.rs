//! One-file-per-key storage under a cache directory.

use std::io;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use trashmap_core::{KeyValueError, KeyValueStore};

/// [`KeyValueStore`] writing each key to `<dir>/<key>.json`.
///
/// Writes go through a temporary sibling and a rename, so an interrupted
/// write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: Utf8PathBuf,
}

impl FileKeyValueStore {
    /// Store entries under `dir`, created on first write.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path holding `key`, or an error when `key` could escape the directory.
    pub fn path_for(&self, key: &str) -> io::Result<Utf8PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{key:?} is not a valid cache key"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait(?Send)]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        self.path_for(key)
            .and_then(|path| trashmap_fs::read_optional(&path))
            .map_err(|source| KeyValueError::Read {
                key: key.to_owned(),
                source: source.into(),
            })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        self.path_for(key)
            .and_then(|path| trashmap_fs::write_replacing(&path, value))
            .map_err(|source| KeyValueError::Write {
                key: key.to_owned(),
                source: source.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn store() -> (TempDir, FileKeyValueStore) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join("cache")).expect("utf-8 path");
        (dir, FileKeyValueStore::new(root))
    }

    #[rstest]
    #[tokio::test]
    async fn round_trips_through_disk(store: (TempDir, FileKeyValueStore)) {
        let (_guard, store) = store;
        assert_eq!(store.get("pontos_cache").await.expect("read"), None);

        store.set("pontos_cache", "[]").await.expect("write");

        assert_eq!(
            store.get("pontos_cache").await.expect("read").as_deref(),
            Some("[]")
        );
        assert!(store.dir().join("pontos_cache.json").is_file());
    }

    #[rstest]
    #[case("../escape")]
    #[case("a/b")]
    #[case(".hidden")]
    #[case("")]
    #[tokio::test]
    async fn rejects_keys_outside_the_directory(
        store: (TempDir, FileKeyValueStore),
        #[case] key: &str,
    ) {
        let (_guard, store) = store;
        assert!(matches!(
            store.set(key, "x").await,
            Err(KeyValueError::Write { .. })
        ));
    }
}
