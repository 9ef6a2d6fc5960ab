//! Tunables for the map surface.
//!
//! Defaults reproduce the behaviour of the mobile client: a country-wide
//! fallback viewport over Brazil, a city-scale frame once the device location
//! is known, and short camera animations that keep the selected marker above
//! the detail panel.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Region;

/// Approximate geographic centre of Brazil.
pub const DEFAULT_REGION: Region = Region {
    latitude: -14.235_004,
    longitude: -51.925_28,
    latitude_delta: 40.0,
    longitude_delta: 40.0,
};

/// Map behaviour configuration.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use trashmap_core::MapConfig;
///
/// let config = MapConfig::default().with_handoff_delay(Duration::ZERO);
/// assert_eq!(config.handoff_delay, Duration::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Viewport shown before, or without, a device location.
    pub default_region: Region,
    /// Latitude span used once the device location resolves.
    pub located_latitude_delta: f64,
    /// Longitude span used once the device location resolves.
    pub located_longitude_delta: f64,
    /// Degrees subtracted from a selected point's latitude so the marker
    /// stays visible above the expanded panel.
    pub selection_latitude_offset: f64,
    /// Span of the viewport framing a selected point.
    pub selection_delta: f64,
    /// Duration of selection and restore camera animations.
    #[serde(with = "millis")]
    pub animation_duration: Duration,
    /// Pause before an inbound navigation selection animates the camera.
    #[serde(with = "millis")]
    pub handoff_delay: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_region: DEFAULT_REGION,
            located_latitude_delta: 0.0922,
            located_longitude_delta: 0.0421,
            selection_latitude_offset: 0.0025,
            selection_delta: 0.01,
            animation_duration: Duration::from_millis(500),
            handoff_delay: Duration::from_millis(300),
        }
    }
}

impl MapConfig {
    /// Override the inbound navigation delay.
    #[must_use]
    pub fn with_handoff_delay(mut self, delay: Duration) -> Self {
        self.handoff_delay = delay;
        self
    }

    /// Override the camera animation duration.
    #[must_use]
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
