//! The displayed point set and the rule deciding which result wins.

use std::cmp::Ordering;

use geo::{Coord, Distance, Haversine};

use crate::{Point, PointId};

/// Where the displayed points came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointOrigin {
    /// Nothing has resolved yet.
    #[default]
    Empty,
    /// The persisted snapshot.
    Cache,
    /// A successful remote fetch.
    Remote,
}

/// Points currently shown as markers.
///
/// A set is replaced wholesale, never merged. Once a remote result has been
/// accepted, later cache reads are rejected regardless of the order in which
/// the two operations complete.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trashmap_core::{Point, PointOrigin, PointSet};
///
/// let remote = vec![Point::new("1", "Ecoponto", Coord { x: 0.0, y: 0.0 })];
/// let cached = vec![Point::new("2", "Antigo", Coord { x: 1.0, y: 1.0 })];
///
/// let mut set = PointSet::default();
/// assert!(set.offer(PointOrigin::Remote, remote.clone()));
/// assert!(!set.offer(PointOrigin::Cache, cached));
/// assert_eq!(set.points(), remote.as_slice());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
    origin: PointOrigin,
}

impl PointSet {
    /// Offer a freshly resolved result, returning whether it was accepted.
    pub fn offer(&mut self, origin: PointOrigin, points: Vec<Point>) -> bool {
        let accept = match origin {
            PointOrigin::Empty => false,
            PointOrigin::Cache => self.origin != PointOrigin::Remote,
            PointOrigin::Remote => true,
        };
        if accept {
            self.points = points;
            self.origin = origin;
        }
        accept
    }

    /// Displayed points in source order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Provenance of [`PointSet::points`].
    pub const fn origin(&self) -> PointOrigin {
        self.origin
    }

    /// Number of displayed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point is displayed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a displayed point by id.
    pub fn find(&self, id: &PointId) -> Option<&Point> {
        self.points.iter().find(|point| &point.id == id)
    }

    /// Up to `limit` points ordered by great-circle distance from `origin`.
    ///
    /// `origin` uses `x = longitude`, `y = latitude`. Ties keep source order.
    pub fn nearest(&self, origin: Coord<f64>, limit: usize) -> Vec<(&Point, f64)> {
        let from = geo::Point::from(origin);
        let mut ranked: Vec<_> = self
            .points
            .iter()
            .map(|point| {
                let meters = Haversine.distance(from, geo::Point::from(point.location()));
                (point, meters)
            })
            .collect();
        ranked.sort_by(|left, right| left.1.partial_cmp(&right.1).unwrap_or(Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    /// Consume the set, keeping source order.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(id: &str, x: f64, y: f64) -> Point {
        Point::new(id, id, Coord { x, y })
    }

    #[rstest]
    #[case(PointOrigin::Cache, PointOrigin::Remote, PointOrigin::Remote)]
    #[case(PointOrigin::Remote, PointOrigin::Cache, PointOrigin::Remote)]
    #[case(PointOrigin::Remote, PointOrigin::Remote, PointOrigin::Remote)]
    #[case(PointOrigin::Cache, PointOrigin::Cache, PointOrigin::Cache)]
    fn remote_results_outrank_cache(
        #[case] first: PointOrigin,
        #[case] second: PointOrigin,
        #[case] expected: PointOrigin,
    ) {
        let mut set = PointSet::default();
        set.offer(first, vec![point("first", 0.0, 0.0)]);
        set.offer(second, vec![point("second", 0.0, 0.0)]);
        assert_eq!(set.origin(), expected);
    }

    #[rstest]
    fn later_remote_replaces_earlier_remote() {
        let mut set = PointSet::default();
        set.offer(PointOrigin::Remote, vec![point("a", 0.0, 0.0)]);
        set.offer(PointOrigin::Remote, vec![point("b", 0.0, 0.0)]);
        assert_eq!(set.points(), [point("b", 0.0, 0.0)].as_slice());
    }

    #[rstest]
    fn nearest_orders_by_distance() {
        let mut set = PointSet::default();
        set.offer(
            PointOrigin::Remote,
            vec![
                point("far", -43.2, -22.9),
                point("near", -46.64, -23.55),
                point("middle", -47.06, -22.9),
            ],
        );
        let ranked: Vec<_> = set
            .nearest(Coord { x: -46.63, y: -23.55 }, 2)
            .into_iter()
            .map(|(point, _)| point.id.as_str())
            .collect();
        assert_eq!(ranked, ["near", "middle"]);
    }

    #[rstest]
    fn find_matches_by_id() {
        let mut set = PointSet::default();
        set.offer(PointOrigin::Cache, vec![point("a", 0.0, 0.0)]);
        assert!(set.find(&PointId::new("a")).is_some());
        assert!(set.find(&PointId::new("z")).is_none());
    }
}
