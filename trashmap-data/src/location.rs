//! Location source for hosts without positioning hardware.

use async_trait::async_trait;
use geo::Coord;
use trashmap_core::{DeviceLocation, LocationError, PermissionStatus};

/// [`DeviceLocation`] reporting a configured fix.
///
/// Without a fix the source behaves like a device whose user refused
/// location access, so the map keeps its default region.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StaticDeviceLocation {
    fix: Option<Coord<f64>>,
}

impl StaticDeviceLocation {
    /// Report `fix` (`x = longitude`, `y = latitude`).
    pub const fn at(fix: Coord<f64>) -> Self {
        Self { fix: Some(fix) }
    }

    /// Report no location at all.
    pub const fn unavailable() -> Self {
        Self { fix: None }
    }
}

#[async_trait(?Send)]
impl DeviceLocation for StaticDeviceLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if self.fix.is_some() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn last_known(&self) -> Result<Option<Coord<f64>>, LocationError> {
        Ok(self.fix)
    }

    async fn current(&self) -> Result<Coord<f64>, LocationError> {
        self.fix.ok_or(LocationError::PermissionDenied)
    }
}
