//! SQLite-backed key-value storage.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, params};
use thiserror::Error;
use trashmap_core::{KeyValueError, KeyValueStore};

/// Errors raised while opening a [`SqliteKeyValueStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: SqliteError,
    },
    /// Creating the `kv` table failed.
    #[error("failed to create kv table")]
    CreateSchema {
        #[source]
        source: SqliteError,
    },
}

/// Durable [`KeyValueStore`] keeping one row per key.
pub struct SqliteKeyValueStore {
    connection: Connection,
}

impl std::fmt::Debug for SqliteKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKeyValueStore")
            .field("path", &self.connection.path())
            .finish()
    }
}

impl SqliteKeyValueStore {
    /// Open or create a database at `path`.
    ///
    /// Parent directories are created and the `kv` table is initialised if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory, database or schema cannot be
    /// created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        trashmap_fs::ensure_parent_dir(path).map_err(|source| {
            SqliteStoreError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error when SQLite cannot allocate the database.
    pub fn in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteStoreError> {
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|source| SqliteStoreError::CreateSchema { source })?;
        Ok(Self { connection })
    }
}

#[async_trait(?Send)]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        self.connection
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|source| KeyValueError::Read {
                key: key.to_owned(),
                source: source.into(),
            })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        self.connection
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(drop)
            .map_err(|source| KeyValueError::Write {
                key: key.to_owned(),
                source: source.into(),
            })
    }
}
