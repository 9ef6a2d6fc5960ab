//! Data access adapters for the collection-point map.
//!
//! Responsibilities:
//! - Implement the point, search, material and connectivity ports of
//!   `trashmap-core` over the hosted PostgREST API.
//! - Provide durable key-value backends for the point cache.
//! - Provide a location source for hosts without GPS.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `trashmap-core`).
//! - Requests are asynchronous and never own a runtime; callers drive them.

#![forbid(unsafe_code)]

mod location;
pub mod remote;
pub mod store;

pub use location::StaticDeviceLocation;
pub use remote::{
    ClientBuildError, HttpConnectivityProbe, HttpMaterialSource, HttpPointSource,
    HttpSearchSource, SupabaseClient, SupabaseConfig,
};
pub use store::{FileKeyValueStore, SqliteKeyValueStore, SqliteStoreError};
