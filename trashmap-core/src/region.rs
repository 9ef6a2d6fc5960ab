//! Map viewports.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Viewport centred on a coordinate with a latitude/longitude span.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trashmap_core::Region;
///
/// let region = Region::centred_on(Coord { x: -46.6, y: -23.5 }, 0.1, 0.05);
/// assert_eq!(region.center(), Coord { x: -46.6, y: -23.5 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    /// Build a region around `center` (`x = longitude`, `y = latitude`).
    pub const fn centred_on(center: Coord<f64>, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude: center.y,
            longitude: center.x,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Centre of the viewport.
    pub const fn center(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}
