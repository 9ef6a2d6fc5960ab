//! `materials` command: list the material catalogue.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use trashmap_core::{Material, MaterialId, MaterialSource};
use trashmap_data::HttpMaterialSource;

use crate::backend::{BackendConfig, write_json};
use crate::{CMD_MATERIALS, CliError};

/// CLI arguments for the `materials` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List the material categories in creation order, with the \
                 label colour that stays readable on each background.",
    about = "List the material catalogue"
)]
#[ortho_config(prefix = "TRASHMAP")]
pub(crate) struct MaterialsArgs {
    /// Project URL of the backend.
    #[arg(long = crate::ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Anonymous API key.
    #[arg(long = crate::ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
}

impl MaterialsArgs {
    pub(crate) fn into_config(self) -> Result<BackendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BackendConfig::try_from(merged)
    }
}

impl TryFrom<MaterialsArgs> for BackendConfig {
    type Error = CliError;

    fn try_from(args: MaterialsArgs) -> Result<Self, Self::Error> {
        Self::require(CMD_MATERIALS, args.base_url, args.api_key)
    }
}

#[derive(Debug, Serialize)]
struct MaterialRow<'a> {
    id: MaterialId,
    name: &'a str,
    color: Option<&'a str>,
    text_color: &'static str,
}

impl<'a> From<&'a Material> for MaterialRow<'a> {
    fn from(material: &'a Material) -> Self {
        Self {
            id: material.id,
            name: &material.name,
            color: material.color.as_deref(),
            text_color: material.text_color().as_hex(),
        }
    }
}

pub(crate) async fn run_materials(
    args: MaterialsArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let backend = args.into_config()?;
    let source = HttpMaterialSource::new(backend.client()?);
    run_materials_with(&source, writer).await
}

/// Print every material in `source` with its label colour.
pub(crate) async fn run_materials_with(
    source: &dyn MaterialSource,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let materials = source.fetch_materials().await?;
    let rows: Vec<MaterialRow<'_>> = materials.iter().map(MaterialRow::from).collect();
    write_json(writer, &rows)
}
