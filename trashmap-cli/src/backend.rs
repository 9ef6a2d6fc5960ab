//! Backend wiring shared by the subcommands.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use trashmap_core::{PointCache, PointRepository};
use trashmap_data::{
    HttpConnectivityProbe, HttpPointSource, SqliteKeyValueStore, SupabaseClient, SupabaseConfig,
};

use crate::{ARG_API_KEY, ARG_BASE_URL, CliError, env_var};

/// Default location of the point cache database.
pub(crate) const DEFAULT_CACHE_DB: &str = "trashmap-cache.sqlite3";

/// Resolved backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackendConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl BackendConfig {
    /// Require both connection settings for `command`.
    pub(crate) fn require(
        command: &'static str,
        base_url: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, CliError> {
        let base_url = base_url.ok_or_else(|| CliError::MissingArgument {
            field: ARG_BASE_URL,
            env: env_var(command, ARG_BASE_URL),
        })?;
        let api_key = api_key.ok_or_else(|| CliError::MissingArgument {
            field: ARG_API_KEY,
            env: env_var(command, ARG_API_KEY),
        })?;
        Ok(Self { base_url, api_key })
    }

    pub(crate) fn client(&self) -> Result<SupabaseClient, CliError> {
        SupabaseClient::new(SupabaseConfig::new(&self.base_url, &self.api_key)).map_err(
            |source| CliError::BuildClient {
                base_url: self.base_url.clone(),
                source,
            },
        )
    }
}

/// Cache path, falling back to [`DEFAULT_CACHE_DB`].
pub(crate) fn cache_path(cache_db: Option<Utf8PathBuf>) -> Utf8PathBuf {
    cache_db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CACHE_DB))
}

/// Repository reading the hosted procedure and caching in SQLite.
pub(crate) fn point_repository(
    backend: &BackendConfig,
    cache_db: &Utf8Path,
) -> Result<PointRepository, CliError> {
    let client = backend.client()?;
    let store = SqliteKeyValueStore::open(cache_db).map_err(|source| CliError::OpenCache {
        path: cache_db.to_path_buf(),
        source,
    })?;
    Ok(PointRepository::new(
        Box::new(HttpPointSource::new(client.clone())),
        Box::new(HttpConnectivityProbe::new(client)),
        PointCache::new(Box::new(store)),
    ))
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
