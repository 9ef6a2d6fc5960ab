//! Core domain for the collection-point map.
//!
//! The crate models waste-collection points, keeps a durable snapshot of the
//! last remote point set, and drives the map surface: location resolution,
//! single-point selection and cross-screen handoff from search. Platform
//! capabilities (storage, network, GPS, camera, panel) are reached through
//! traits so the logic runs unchanged under tests.
//!
//! Everything here is single-threaded. Shared state uses `Rc` and `RefCell`
//! and async traits are declared `?Send`.

#![forbid(unsafe_code)]

mod cache;
pub mod config;
mod coordinator;
mod handoff;
mod lifetime;
mod location;
mod material;
mod point;
mod region;
pub mod repository;
mod search;
mod selection;

#[doc(hidden)]
pub mod test_support;

pub use cache::{
    BackendError, CacheError, KeyValueError, KeyValueStore, POINT_CACHE_KEY, PointCache,
};
pub use config::{DEFAULT_REGION, MapConfig};
pub use coordinator::{MapView, MapViewCoordinator};
pub use handoff::{HandoffId, NavigationChannel, PointHandoff};
pub use lifetime::Lifetime;
pub use location::{DeviceLocation, LocationError, LocationProvider, PermissionStatus};
pub use material::{
    Material, MaterialFilter, MaterialSource, MaterialSourceError, TextColor, load_materials,
};
pub use point::{MaterialId, Point, PointId};
pub use region::Region;
pub use repository::{
    ConnectivityProbe, PointOrigin, PointRepository, PointSet, PointSource, RefreshReport,
    RemoteFetchError, RemoteStatus,
};
pub use search::{SearchError, SearchFilter, SearchQuery, SearchSource};
pub use selection::{
    AnimationId, CameraControl, DetailPanel, SelectionController, SelectionState,
};
