//! Accepted-material categories and filters.

use std::collections::BTreeSet;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MaterialId, Point};

/// Perceived brightness, scaled by 1000, above which a background takes
/// dark text.
const BRIGHTNESS_THRESHOLD: u32 = 160_000;

/// A material category such as paper, glass or batteries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Background colour as `#rrggbb`, when the catalogue defines one.
    #[serde(default)]
    pub color: Option<String>,
}

impl Material {
    /// Label colour readable on top of [`Material::color`].
    pub fn text_color(&self) -> TextColor {
        TextColor::contrasting(self.color.as_deref())
    }
}

/// Label colour chosen for a material chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    /// Pick black or white text for a `#rrggbb` background.
    ///
    /// Missing colours and values without a leading `#` fall back to black.
    /// A `#` value whose channels do not parse falls back to white.
    ///
    /// # Examples
    /// ```
    /// use trashmap_core::TextColor;
    ///
    /// assert_eq!(TextColor::contrasting(Some("#ffffff")), TextColor::Black);
    /// assert_eq!(TextColor::contrasting(Some("#1b5e20")), TextColor::White);
    /// assert_eq!(TextColor::contrasting(None), TextColor::Black);
    /// ```
    pub fn contrasting(background: Option<&str>) -> Self {
        let Some(hex) = background.and_then(|value| value.strip_prefix('#')) else {
            return Self::Black;
        };
        match perceived_brightness(hex) {
            Some(brightness) if brightness > BRIGHTNESS_THRESHOLD => Self::Black,
            _ => Self::White,
        }
    }

    /// Hex notation of the colour.
    pub const fn as_hex(self) -> &'static str {
        match self {
            Self::Black => "#000",
            Self::White => "#fff",
        }
    }
}

/// ITU-R BT.601 luma of a `rrggbb` string, scaled by 1000.
fn perceived_brightness(hex: &str) -> Option<u32> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u32::from_str_radix(digits, 16).ok())
    };
    let red = channel(0..2)?;
    let green = channel(2..4)?;
    let blue = channel(4..6)?;
    Some(red * 299 + green * 587 + blue * 114)
}

/// Material ids a search result must all accept.
///
/// An empty filter matches every point.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trashmap_core::{MaterialFilter, MaterialId, Point};
///
/// let point = Point::new("1", "Ecoponto", Coord { x: 0.0, y: 0.0 })
///     .with_materials(["Papel", "Vidro"], [MaterialId(1), MaterialId(2)]);
///
/// assert!(MaterialFilter::from_iter([MaterialId(1)]).matches(&point));
/// assert!(!MaterialFilter::from_iter([MaterialId(1), MaterialId(9)]).matches(&point));
/// assert!(MaterialFilter::default().matches(&point));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    ids: BTreeSet<MaterialId>,
}

impl MaterialFilter {
    /// Whether no material restriction applies.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.ids.iter().copied()
    }

    /// Add an id to the filter.
    pub fn insert(&mut self, id: MaterialId) -> bool {
        self.ids.insert(id)
    }

    /// Toggle an id, returning whether it is now selected.
    pub fn toggle(&mut self, id: MaterialId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id)
        }
    }

    /// Whether `point` accepts every selected material.
    pub fn matches(&self, point: &Point) -> bool {
        self.ids.is_subset(&point.accepted_materials_id)
    }
}

impl FromIterator<MaterialId> for MaterialFilter {
    fn from_iter<I: IntoIterator<Item = MaterialId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Errors raised while listing the material catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialSourceError {
    /// The catalogue could not be reached.
    #[error("failed to fetch materials from {url}: {message}")]
    Unavailable { url: String, message: String },
    /// The catalogue answered with an unexpected payload.
    #[error("failed to decode materials: {message}")]
    Decode { message: String },
}

/// Remote catalogue of materials, ordered by creation time.
#[async_trait(?Send)]
pub trait MaterialSource {
    /// Fetch every material category.
    async fn fetch_materials(&self) -> Result<Vec<Material>, MaterialSourceError>;
}

/// Load the catalogue, degrading to an empty list on failure.
pub async fn load_materials(source: &dyn MaterialSource) -> Vec<Material> {
    match source.fetch_materials().await {
        Ok(materials) => materials,
        Err(err) => {
            warn!("material catalogue unavailable: {err}");
            Vec::new()
        }
    }
}
