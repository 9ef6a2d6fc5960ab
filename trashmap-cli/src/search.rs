//! `search` command: query collection points by name and material.

use std::io::Write;

use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use trashmap_core::{MaterialFilter, MaterialId, NavigationChannel, SearchFilter};
use trashmap_data::HttpSearchSource;

use crate::backend::{BackendConfig, write_json};
use crate::{ARG_MATERIAL, ARG_TEXT, CMD_SEARCH, CliError, env_var};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Search collection points whose name contains the given \
                 text. Repeat --material to require every listed material \
                 id. Matches are printed as JSON.",
    about = "Search collection points by name and material"
)]
#[ortho_config(prefix = "TRASHMAP")]
pub(crate) struct SearchArgs {
    /// Text to look for in point names.
    #[arg(value_name = "text")]
    #[serde(default)]
    pub(crate) text: Option<String>,
    /// Material id every result must accept.
    #[arg(long = ARG_MATERIAL, value_name = "id")]
    #[serde(default)]
    pub(crate) material: Option<Vec<u64>>,
    /// Project URL of the backend.
    #[arg(long = crate::ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Anonymous API key.
    #[arg(long = crate::ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
}

/// Resolved `search` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    pub(crate) text: String,
    pub(crate) materials: MaterialFilter,
    pub(crate) backend: BackendConfig,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let text = args.text.ok_or_else(|| CliError::MissingArgument {
            field: ARG_TEXT,
            env: env_var(CMD_SEARCH, ARG_TEXT),
        })?;
        let materials = args
            .material
            .unwrap_or_default()
            .into_iter()
            .map(MaterialId)
            .collect();
        Ok(Self {
            text,
            materials,
            backend: BackendConfig::require(CMD_SEARCH, args.base_url, args.api_key)?,
        })
    }
}

pub(crate) async fn run_search(args: SearchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let source = HttpSearchSource::new(config.backend.client()?);
    let filter = SearchFilter::new(Box::new(source), NavigationChannel::default());
    run_search_with(&filter, &config.text, &config.materials, writer).await
}

/// Run one query through `filter` and print the matches.
pub(crate) async fn run_search_with(
    filter: &SearchFilter,
    text: &str,
    materials: &MaterialFilter,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let points = filter.try_search(text, materials).await?;
    info!("{} points match {text:?}", points.len());
    write_json(writer, &points)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
