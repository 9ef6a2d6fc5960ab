//! Waste-collection points and the identifiers attached to them.

use std::collections::BTreeSet;
use std::fmt;

use geo::Coord;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a collection point.
///
/// The remote procedure may emit numeric or textual ids; both decode into
/// the same textual form so identity comparisons stay stable across the
/// cache and the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawPointId", into = "String")]
pub struct PointId(String);

impl PointId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PointId> for String {
    fn from(id: PointId) -> Self {
        id.0
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPointId {
    Text(String),
    Number(i64),
}

impl From<RawPointId> for PointId {
    fn from(raw: RawPointId) -> Self {
        match raw {
            RawPointId::Text(text) => Self(text),
            RawPointId::Number(number) => Self(number.to_string()),
        }
    }
}

/// Identifier of an accepted material category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MaterialId(pub u64);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A waste-collection location.
///
/// Points are immutable once fetched and compared by [`PointId`] when the
/// map decides whether two references denote the same place.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trashmap_core::{MaterialId, Point};
///
/// let point = Point::new("7", "Ecoponto Centro", Coord { x: -46.63, y: -23.55 })
///     .with_materials(["Vidro"], [MaterialId(3)]);
///
/// assert_eq!(point.location().y, -23.55);
/// assert!(point.accepts(MaterialId(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable material names, in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub accepted_materials: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accepted_materials_id: BTreeSet<MaterialId>,
}

impl Point {
    /// Construct a point that accepts no materials yet.
    ///
    /// `location` uses `x = longitude` and `y = latitude`.
    pub fn new(id: impl Into<PointId>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: location.y,
            longitude: location.x,
            accepted_materials: Vec::new(),
            accepted_materials_id: BTreeSet::new(),
        }
    }

    /// Attach accepted material names and ids.
    #[must_use]
    pub fn with_materials<N, S, I>(mut self, names: N, ids: I) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = MaterialId>,
    {
        self.accepted_materials = names.into_iter().map(Into::into).collect();
        self.accepted_materials_id = ids.into_iter().collect();
        self
    }

    /// Position as a WGS84 coordinate.
    pub fn location(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    /// Whether the point lists `material` among its accepted ids.
    pub fn accepts(&self, material: MaterialId) -> bool {
        self.accepted_materials_id.contains(&material)
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
