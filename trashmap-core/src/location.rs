//! Device location resolution.
//!
//! Location never gates the map: callers render the default region first and
//! re-centre once [`LocationProvider::resolve`] yields a fix.

use async_trait::async_trait;
use geo::Coord;
use log::{debug, warn};
use thiserror::Error;

/// Answer to a foreground location permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Errors raised while resolving the device location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user refused foreground location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// The platform could not produce a fix.
    #[error("location unavailable: {message}")]
    Unavailable { message: String },
}

/// Platform location services.
///
/// Coordinates use `x = longitude` and `y = latitude`.
#[async_trait(?Send)]
pub trait DeviceLocation {
    /// Ask for foreground location access.
    async fn request_permission(&self) -> PermissionStatus;
    /// Most recent cached fix, if the platform holds one.
    async fn last_known(&self) -> Result<Option<Coord<f64>>, LocationError>;
    /// Acquire a fresh fix.
    async fn current(&self) -> Result<Coord<f64>, LocationError>;
}

/// Resolve the coordinates the map should centre on.
pub struct LocationProvider {
    device: Box<dyn DeviceLocation>,
}

impl std::fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProvider").finish_non_exhaustive()
    }
}

impl LocationProvider {
    /// Wrap the platform location service.
    pub fn new(device: Box<dyn DeviceLocation>) -> Self {
        Self { device }
    }

    /// Resolve a fix, or `None` when the caller should keep the default
    /// region.
    pub async fn resolve(&self) -> Option<Coord<f64>> {
        match self.try_resolve().await {
            Ok(location) => Some(location),
            Err(LocationError::PermissionDenied) => {
                warn!("location permission denied; keeping default region");
                None
            }
            Err(err) => {
                warn!("{err}; keeping default region");
                None
            }
        }
    }

    /// Resolve a fix, preferring the last-known position for latency.
    pub async fn try_resolve(&self) -> Result<Coord<f64>, LocationError> {
        if self.device.request_permission().await == PermissionStatus::Denied {
            return Err(LocationError::PermissionDenied);
        }
        match self.device.last_known().await {
            Ok(Some(location)) => return Ok(location),
            Ok(None) => debug!("no last-known fix; requesting a fresh one"),
            Err(err) => debug!("last-known fix unavailable ({err}); requesting a fresh one"),
        }
        self.device.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubDeviceLocation;
    use rstest::rstest;

    const LAST: Coord<f64> = Coord { x: -46.6, y: -23.5 };
    const FRESH: Coord<f64> = Coord { x: -43.2, y: -22.9 };

    #[rstest]
    #[tokio::test]
    async fn denied_permission_yields_none() {
        let device = StubDeviceLocation::denied();
        let provider = LocationProvider::new(Box::new(device.clone()));
        assert_eq!(provider.resolve().await, None);
        assert_eq!(device.fix_requests(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn prefers_last_known_fix() {
        let provider = LocationProvider::new(Box::new(
            StubDeviceLocation::granted(Some(LAST), Ok(FRESH)),
        ));
        assert_eq!(provider.resolve().await, Some(LAST));
    }

    #[rstest]
    #[tokio::test]
    async fn falls_back_to_fresh_fix() {
        let provider =
            LocationProvider::new(Box::new(StubDeviceLocation::granted(None, Ok(FRESH))));
        assert_eq!(provider.resolve().await, Some(FRESH));
    }

    #[rstest]
    #[tokio::test]
    async fn failing_fix_degrades_to_none() {
        let provider = LocationProvider::new(Box::new(StubDeviceLocation::granted(
            None,
            Err(LocationError::Unavailable {
                message: "no satellites".into(),
            }),
        )));
        assert_eq!(provider.resolve().await, None);
    }
}
