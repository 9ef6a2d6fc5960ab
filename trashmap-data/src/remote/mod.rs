//! HTTP adapters for the hosted point catalogue.
//!
//! Every adapter wraps a shared [`SupabaseClient`] that attaches the project
//! API key. Requests are asynchronous and run on the caller's executor.
//!
//! # Example
//!
//! ```no_run
//! use trashmap_core::PointSource;
//! use trashmap_data::remote::{HttpPointSource, SupabaseClient, SupabaseConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SupabaseClient::new(SupabaseConfig::new("https://xyz.supabase.co", "anon"))?;
//! let points = HttpPointSource::new(client).fetch_points().await?;
//! println!("{} points", points.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod points;

pub use client::{ClientBuildError, SupabaseClient};
pub use config::{DEFAULT_USER_AGENT, SupabaseConfig};
pub use points::{
    HttpConnectivityProbe, HttpMaterialSource, HttpPointSource, HttpSearchSource,
    MATERIALS_TABLE, POINTS_PROCEDURE, SEARCH_VIEW, search_params,
};
