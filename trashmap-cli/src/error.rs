//! Error types emitted by the TrashMap CLI.
//!
//! Degraded paths (offline, stale cache, failed refresh) are logged by the
//! core and never reach this type.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use trashmap_core::{MaterialSourceError, SearchError};
use trashmap_data::{ClientBuildError, SqliteStoreError};

/// Errors emitted by the TrashMap CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument { field: &'static str, env: String },
    /// An option was present but unusable.
    #[error("invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },
    /// The async runtime could not start.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The backend client could not be built.
    #[error("failed to build client for {base_url:?}: {source}")]
    BuildClient {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// The point cache database could not be opened.
    #[error("failed to open point cache at {path:?}: {source}")]
    OpenCache {
        path: Utf8PathBuf,
        #[source]
        source: SqliteStoreError,
    },
    /// The search endpoint failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    /// The material catalogue could not be listed.
    #[error("failed to list materials: {0}")]
    Materials(#[from] MaterialSourceError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
