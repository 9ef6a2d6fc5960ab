//! Cross-screen delivery of a selected point from search to the map.

use std::cell::RefCell;
use std::rc::Rc;

use crate::Point;

/// Identity of one navigation event.
///
/// Re-rendering the map with the same handoff must not select again; a new
/// navigation, even to the same point, gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandoffId(u64);

/// A point carried as navigation state.
#[derive(Debug, Clone, PartialEq)]
pub struct PointHandoff {
    id: HandoffId,
    point: Point,
}

impl PointHandoff {
    /// Identity of the navigation that produced this handoff.
    pub const fn id(&self) -> HandoffId {
        self.id
    }

    /// The point to select on arrival.
    pub const fn point(&self) -> &Point {
        &self.point
    }
}

#[derive(Debug, Default)]
struct Route {
    issued: u64,
    current: Option<PointHandoff>,
}

/// Navigation parameters shared by the search and map surfaces.
///
/// Like route parameters, the latest handoff stays readable until replaced,
/// cleared or taken. The map takes it, so every clone of the channel sees a
/// handoff consumed at most once.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trashmap_core::{NavigationChannel, Point};
///
/// let channel = NavigationChannel::default();
/// let id = channel.navigate_with(Point::new("1", "Ecoponto", Coord { x: 0.0, y: 0.0 }));
/// assert_eq!(channel.current().map(|handoff| handoff.id()), Some(id));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NavigationChannel {
    route: Rc<RefCell<Route>>,
}

impl NavigationChannel {
    /// Navigate to the map carrying `point`.
    pub fn navigate_with(&self, point: Point) -> HandoffId {
        let mut route = self.route.borrow_mut();
        route.issued += 1;
        let id = HandoffId(route.issued);
        route.current = Some(PointHandoff { id, point });
        id
    }

    /// The latest handoff, if any.
    pub fn current(&self) -> Option<PointHandoff> {
        self.route.borrow().current.clone()
    }

    /// Remove and return the pending handoff.
    pub fn take(&self) -> Option<PointHandoff> {
        self.route.borrow_mut().current.take()
    }

    /// Drop the pending handoff.
    pub fn clear(&self) {
        self.route.borrow_mut().current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_points;
    use rstest::rstest;

    #[rstest]
    fn each_navigation_gets_a_new_identity() {
        let channel = NavigationChannel::default();
        let point = sample_points().remove(0);
        let first = channel.navigate_with(point.clone());
        let second = channel.navigate_with(point);
        assert_ne!(first, second);
    }

    #[rstest]
    fn clones_share_the_route() {
        let channel = NavigationChannel::default();
        let reader = channel.clone();
        channel.navigate_with(sample_points().remove(0));
        assert!(reader.current().is_some());
        reader.clear();
        assert!(channel.current().is_none());
    }

    #[rstest]
    fn taking_consumes_for_every_clone() {
        let channel = NavigationChannel::default();
        let reader = channel.clone();
        let id = channel.navigate_with(sample_points().remove(0));

        assert_eq!(reader.take().map(|handoff| handoff.id()), Some(id));
        assert!(reader.take().is_none());
        assert!(channel.current().is_none());
    }
}
