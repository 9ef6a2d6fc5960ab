//! Map surface orchestration.
//!
//! The coordinator owns no business rules: it wires location, the point
//! repository and the selection controller to the events a map surface
//! produces, and guards every post-await mutation with the surface
//! [`Lifetime`].

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::join;
use log::debug;

use crate::{
    AnimationId, CameraControl, DetailPanel, Lifetime, LocationProvider, MapConfig,
    NavigationChannel, Point, PointId, PointRepository, PointSet, Region, SelectionController,
    SelectionState,
};

/// What the map surface renders.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// Current viewport.
    pub region: Region,
    /// Markers on the map.
    pub markers: PointSet,
    /// Whether the first meaningful frame is ready.
    pub visible: bool,
}

/// Glue between the map surface and the point/selection machinery.
pub struct MapViewCoordinator {
    config: MapConfig,
    location: LocationProvider,
    repository: Rc<PointRepository>,
    selection: RefCell<SelectionController>,
    view: RefCell<MapView>,
    lifetime: Lifetime,
}

impl std::fmt::Debug for MapViewCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapViewCoordinator")
            .field("view", &self.view)
            .field("selection", &self.selection)
            .field("alive", &self.lifetime.is_alive())
            .finish_non_exhaustive()
    }
}

impl MapViewCoordinator {
    /// Create a coordinator for one mount of the map surface.
    ///
    /// The view starts on the configured default region with whatever the
    /// repository displayed during earlier mounts.
    pub fn new(
        config: MapConfig,
        location: LocationProvider,
        repository: Rc<PointRepository>,
        camera: Rc<dyn CameraControl>,
        panel: Rc<dyn DetailPanel>,
    ) -> Self {
        let lifetime = Lifetime::new();
        let selection = SelectionController::new(camera, panel, &config, lifetime.clone());
        let view = MapView {
            region: config.default_region,
            markers: repository.snapshot(),
            visible: false,
        };
        Self {
            config,
            location,
            repository,
            selection: RefCell::new(selection),
            view: RefCell::new(view),
            lifetime,
        }
    }

    /// Resolve the location and refresh points concurrently, then reveal the
    /// map.
    pub async fn mount(&self) {
        let locate = async {
            let Some(location) = self.location.resolve().await else {
                return;
            };
            if self.lifetime.is_alive() {
                self.view.borrow_mut().region = Region::centred_on(
                    location,
                    self.config.located_latitude_delta,
                    self.config.located_longitude_delta,
                );
            }
        };
        let load = self.repository.refresh_with(|points| {
            if self.lifetime.is_alive() {
                self.view.borrow_mut().markers = points.clone();
            }
        });

        let ((), report) = join!(locate, load);

        if !self.lifetime.is_alive() {
            debug!("map unmounted before first paint");
            return;
        }
        debug!(
            "map ready with {} markers ({:?})",
            report.points.len(),
            report.status
        );
        self.view.borrow_mut().visible = true;
    }

    /// Tear down the surface; later events and pending effects are ignored.
    pub fn unmount(&self) {
        self.lifetime.end();
    }

    /// Snapshot of what the surface renders.
    pub fn view(&self) -> MapView {
        self.view.borrow().clone()
    }

    /// Current selection state.
    pub fn selection(&self) -> SelectionState {
        self.selection.borrow().state().clone()
    }

    /// The user moved the map.
    pub fn region_changed(&self, region: Region) {
        if self.lifetime.is_alive() {
            self.view.borrow_mut().region = region;
        }
    }

    /// A marker was tapped. Returns whether it named a displayed point.
    pub fn marker_tapped(&self, id: &PointId) -> bool {
        let point = self.view.borrow().markers.find(id).cloned();
        match point {
            Some(point) => self.select(point).is_some(),
            None => false,
        }
    }

    /// Consume inbound navigation state.
    ///
    /// The pending handoff is taken from `navigation` before the configured
    /// delay that lets the map surface mount, so repeated renders and later
    /// mounts sharing the channel never select it again.
    pub async fn receive_handoff(&self, navigation: &NavigationChannel) -> bool {
        let Some(handoff) = navigation.take() else {
            return false;
        };
        debug!("received handoff {:?}", handoff.id());

        tokio::time::sleep(self.config.handoff_delay).await;
        if !self.lifetime.is_alive() {
            return false;
        }
        self.select(handoff.point().clone()).is_some()
    }

    /// The map background was tapped.
    pub fn background_tapped(&self) -> bool {
        self.selection.borrow_mut().close()
    }

    /// The detail panel was dismissed by the user.
    pub fn panel_dismissed(&self) -> bool {
        self.selection.borrow_mut().close()
    }

    /// The camera finished an animation.
    pub fn camera_settled(&self, animation: AnimationId) -> bool {
        self.selection.borrow_mut().camera_settled(animation)
    }

    fn select(&self, point: Point) -> Option<AnimationId> {
        let viewport = self.view.borrow().region;
        self.selection.borrow_mut().select_point(point, viewport)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{
        CommandLog, MapCommand, MemoryKeyValueStore, StubConnectivity, StubDeviceLocation,
        StubPointSource, sample_points,
    };
    use crate::{DEFAULT_REGION, PointCache};
    use geo::Coord;
    use rstest::rstest;

    const HERE: Coord<f64> = Coord {
        x: -46.633,
        y: -23.55,
    };

    fn coordinator(device: StubDeviceLocation, log: &CommandLog) -> MapViewCoordinator {
        let repository = PointRepository::new(
            Box::new(StubPointSource::with_points(sample_points())),
            Box::new(StubConnectivity::online()),
            PointCache::new(Box::new(MemoryKeyValueStore::default())),
        );
        MapViewCoordinator::new(
            MapConfig::default().with_handoff_delay(Duration::from_millis(300)),
            LocationProvider::new(Box::new(device)),
            Rc::new(repository),
            Rc::new(log.clone()),
            Rc::new(log.clone()),
        )
    }

    #[rstest]
    fn default_region_is_available_before_mount() {
        let map = coordinator(StubDeviceLocation::denied(), &CommandLog::default());
        let view = map.view();
        assert_eq!(view.region, DEFAULT_REGION);
        assert!(!view.visible);
    }

    #[rstest]
    #[tokio::test]
    async fn denied_location_still_reveals_default_region() {
        let map = coordinator(StubDeviceLocation::denied(), &CommandLog::default());
        map.mount().await;
        let view = map.view();
        assert!(view.visible);
        assert_eq!(view.region, DEFAULT_REGION);
        assert_eq!(view.markers.points(), sample_points().as_slice());
    }

    #[rstest]
    #[tokio::test]
    async fn granted_location_recentres() {
        let map = coordinator(
            StubDeviceLocation::granted(Some(HERE), Ok(HERE)),
            &CommandLog::default(),
        );
        map.mount().await;
        assert_eq!(map.view().region.center(), HERE);
    }

    #[rstest]
    #[tokio::test]
    async fn unmount_during_mount_keeps_map_hidden() {
        let map = coordinator(
            StubDeviceLocation::granted(None, Ok(HERE)).with_delay(Duration::from_millis(20)),
            &CommandLog::default(),
        );
        let mount = map.mount();
        let teardown = async { map.unmount() };
        join!(mount, teardown);
        let view = map.view();
        assert!(!view.visible);
        assert_eq!(view.region, DEFAULT_REGION);
    }

    #[rstest]
    #[tokio::test]
    async fn marker_tap_selects_displayed_point() {
        let log = CommandLog::default();
        let map = coordinator(StubDeviceLocation::denied(), &log);
        map.mount().await;
        let point = sample_points().remove(1);

        assert!(map.marker_tapped(&point.id));
        assert!(!map.marker_tapped(&PointId::new("missing")));

        assert_eq!(map.selection().point(), Some(&point));
        assert!(log.commands().contains(&MapCommand::Expand));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn handoff_selects_once_after_delay() {
        let log = CommandLog::default();
        let map = coordinator(StubDeviceLocation::denied(), &log);
        map.mount().await;
        let navigation = NavigationChannel::default();
        navigation.navigate_with(sample_points().remove(0));

        let started = tokio::time::Instant::now();
        assert!(map.receive_handoff(&navigation).await);
        assert!(started.elapsed() >= Duration::from_millis(300));
        let commands = log.commands().len();

        assert!(!map.receive_handoff(&navigation).await);
        assert_eq!(log.commands().len(), commands);
        assert!(navigation.current().is_none());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn remount_does_not_replay_a_consumed_handoff() {
        let log = CommandLog::default();
        let navigation = NavigationChannel::default();
        navigation.navigate_with(sample_points().remove(0));

        let first = coordinator(StubDeviceLocation::denied(), &log);
        first.mount().await;
        assert!(first.receive_handoff(&navigation).await);
        first.unmount();

        let second = coordinator(StubDeviceLocation::denied(), &log);
        second.mount().await;
        assert!(!second.receive_handoff(&navigation).await);
        assert_eq!(second.selection(), SelectionState::Idle);

        let point = sample_points().remove(2);
        navigation.navigate_with(point.clone());
        assert!(second.receive_handoff(&navigation).await);
        assert_eq!(second.selection().point(), Some(&point));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn handoff_after_unmount_is_dropped() {
        let log = CommandLog::default();
        let map = coordinator(StubDeviceLocation::denied(), &log);
        map.mount().await;
        let navigation = NavigationChannel::default();
        navigation.navigate_with(sample_points().remove(0));

        let receive = map.receive_handoff(&navigation);
        let teardown = async { map.unmount() };
        let (selected, ()) = join!(receive, teardown);

        assert!(!selected);
        assert!(log.commands().is_empty());
        assert_eq!(map.selection(), SelectionState::Idle);
        assert!(navigation.current().is_none());
    }

    fn last_animation(log: &CommandLog) -> AnimationId {
        log.commands()
            .into_iter()
            .rev()
            .find_map(|command| match command {
                MapCommand::Animate(animation, _) => Some(animation),
                MapCommand::Expand | MapCommand::Collapse => None,
            })
            .expect("an animation was issued")
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn both_entry_paths_end_in_the_same_selected_shape() {
        let log = CommandLog::default();
        let map = coordinator(StubDeviceLocation::denied(), &log);
        map.mount().await;
        let searched = sample_points().remove(0);
        let tapped = sample_points().remove(1);
        let navigation = NavigationChannel::default();
        navigation.navigate_with(searched.clone());

        assert!(map.receive_handoff(&navigation).await);
        assert!(map.camera_settled(last_animation(&log)));
        let via_search = map.selection();

        assert!(map.marker_tapped(&tapped.id));
        let stale = last_animation(&log);
        assert!(map.marker_tapped(&tapped.id));
        assert!(!map.camera_settled(stale));
        assert!(map.camera_settled(last_animation(&log)));
        let via_tap = map.selection();

        assert_eq!(via_search, SelectionState::Selected { point: searched });
        assert_eq!(via_tap, SelectionState::Selected { point: tapped });
    }

    #[rstest]
    #[tokio::test]
    async fn background_tap_closes_selection() {
        let log = CommandLog::default();
        let map = coordinator(StubDeviceLocation::denied(), &log);
        map.mount().await;
        map.marker_tapped(&sample_points().remove(0).id);

        assert!(map.background_tapped());
        assert!(!map.background_tapped());

        assert_eq!(map.selection(), SelectionState::Idle);
        assert!(log.commands().ends_with(&[MapCommand::Collapse]));
    }
}
