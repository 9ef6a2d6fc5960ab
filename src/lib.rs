//! Facade crate for the TrashMap collection-point engine.
//!
//! This crate re-exports the core domain types and exposes the hosted backend
//! adapters behind the `http` feature.

#![forbid(unsafe_code)]

pub use trashmap_core::{
    AnimationId, BackendError, CacheError, CameraControl, ConnectivityProbe, DEFAULT_REGION,
    DetailPanel, DeviceLocation, HandoffId, KeyValueError, KeyValueStore, Lifetime, LocationError,
    LocationProvider, MapConfig, MapView, MapViewCoordinator, Material, MaterialFilter, MaterialId,
    MaterialSource, MaterialSourceError, NavigationChannel, POINT_CACHE_KEY, PermissionStatus,
    Point, PointCache, PointHandoff, PointId, PointOrigin, PointRepository, PointSet, PointSource,
    RefreshReport, Region, RemoteFetchError, RemoteStatus, SearchError, SearchFilter, SearchQuery,
    SearchSource, SelectionController, SelectionState, TextColor, load_materials,
};

#[cfg(feature = "http")]
pub use trashmap_data::{
    ClientBuildError, FileKeyValueStore, HttpConnectivityProbe, HttpMaterialSource,
    HttpPointSource, HttpSearchSource, SqliteKeyValueStore, SqliteStoreError,
    StaticDeviceLocation, SupabaseClient, SupabaseConfig,
};
