//! `sync` and `nearby`: refresh the point set and print it.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use trashmap_core::{Point, PointRepository, RemoteStatus};

use crate::backend::{BackendConfig, cache_path, point_repository, write_json};
use crate::{
    ARG_CACHE_DB, ARG_LATITUDE, ARG_LIMIT, ARG_LONGITUDE, CMD_NEARBY, CMD_SYNC, CliError, env_var,
};

/// Nearest points printed when `--limit` is absent.
pub(crate) const DEFAULT_NEARBY_LIMIT: usize = 5;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Refresh the collection points from the backend, falling \
                 back to the local snapshot when offline, and print the \
                 resulting set as JSON.",
    about = "Refresh and print every collection point"
)]
#[ortho_config(prefix = "TRASHMAP")]
pub(crate) struct SyncArgs {
    /// Project URL of the backend.
    #[arg(long = crate::ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Anonymous API key.
    #[arg(long = crate::ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// SQLite file holding the point snapshot.
    #[arg(long = ARG_CACHE_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) cache_db: Option<Utf8PathBuf>,
}

/// Resolved `sync` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyncConfig {
    pub(crate) backend: BackendConfig,
    pub(crate) cache_db: Utf8PathBuf,
}

impl SyncArgs {
    pub(crate) fn into_config(self) -> Result<SyncConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SyncConfig::try_from(merged)
    }
}

impl TryFrom<SyncArgs> for SyncConfig {
    type Error = CliError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            backend: BackendConfig::require(CMD_SYNC, args.base_url, args.api_key)?,
            cache_db: cache_path(args.cache_db),
        })
    }
}

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Refresh the collection points like `sync` and print the \
                 ones closest to a coordinate, with great-circle distances \
                 in metres.",
    about = "Print the collection points nearest to a coordinate"
)]
#[ortho_config(prefix = "TRASHMAP")]
pub(crate) struct NearbyArgs {
    /// Latitude in decimal degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Number of points to print.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Project URL of the backend.
    #[arg(long = crate::ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Anonymous API key.
    #[arg(long = crate::ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// SQLite file holding the point snapshot.
    #[arg(long = ARG_CACHE_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) cache_db: Option<Utf8PathBuf>,
}

/// Resolved `nearby` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) origin: Coord<f64>,
    pub(crate) limit: usize,
    pub(crate) backend: BackendConfig,
    pub(crate) cache_db: Utf8PathBuf,
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let latitude = coordinate(args.latitude, ARG_LATITUDE, 90.0)?;
        let longitude = coordinate(args.longitude, ARG_LONGITUDE, 180.0)?;
        Ok(Self {
            origin: Coord {
                x: longitude,
                y: latitude,
            },
            limit: args.limit.unwrap_or(DEFAULT_NEARBY_LIMIT),
            backend: BackendConfig::require(CMD_NEARBY, args.base_url, args.api_key)?,
            cache_db: cache_path(args.cache_db),
        })
    }
}

fn coordinate(value: Option<f64>, field: &'static str, bound: f64) -> Result<f64, CliError> {
    let value = value.ok_or_else(|| CliError::MissingArgument {
        field,
        env: env_var(CMD_NEARBY, field),
    })?;
    if value.is_finite() && (-bound..=bound).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::InvalidArgument {
            field,
            message: format!("{value} is outside -{bound}..={bound}"),
        })
    }
}

#[derive(Debug, Serialize)]
struct NearbyRow<'a> {
    #[serde(flatten)]
    point: &'a Point,
    distance_m: f64,
}

pub(crate) async fn run_sync(args: SyncArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let repository = point_repository(&config.backend, &config.cache_db)?;
    run_sync_with(&repository, writer).await
}

/// Refresh `repository` and print the displayed set.
pub(crate) async fn run_sync_with(
    repository: &PointRepository,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = repository.refresh_with(|_| {}).await;
    log_status(&report.status, report.points.len());
    write_json(writer, report.points.points())
}

pub(crate) async fn run_nearby(args: NearbyArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let repository = point_repository(&config.backend, &config.cache_db)?;
    run_nearby_with(&repository, config.origin, config.limit, writer).await
}

/// Refresh `repository` and print the `limit` points closest to `origin`.
pub(crate) async fn run_nearby_with(
    repository: &PointRepository,
    origin: Coord<f64>,
    limit: usize,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = repository.refresh_with(|_| {}).await;
    log_status(&report.status, report.points.len());
    let rows: Vec<NearbyRow<'_>> = report
        .points
        .nearest(origin, limit)
        .into_iter()
        .map(|(point, distance_m)| NearbyRow { point, distance_m })
        .collect();
    write_json(writer, &rows)
}

fn log_status(status: &RemoteStatus, count: usize) {
    match status {
        RemoteStatus::Fetched => info!("{count} points fetched"),
        RemoteStatus::Offline => info!("offline; {count} cached points"),
        RemoteStatus::Failed(_) => info!("refresh failed; {count} cached points"),
    }
}

#[cfg(test)]
pub(crate) fn sync_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SyncConfig, CliError> {
    let merged = SyncArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SyncConfig::try_from(merged)
}

#[cfg(test)]
pub(crate) fn nearby_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NearbyConfig, CliError> {
    let merged = NearbyArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NearbyConfig::try_from(merged)
}
