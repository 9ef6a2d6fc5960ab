//! Single-point selection driving the camera and the detail panel.
//!
//! ```text
//! Idle --select--> Selecting --settled--> Selected
//!  ^                 |   ^                   |
//!  |                 |   +------select-------+
//!  +------close------+-----------close-------+
//! ```
//!
//! Camera and panel are reached through injected command capabilities so the
//! controller never holds platform handles.

use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::{Lifetime, MapConfig, Point, Region};

/// Identifier of a camera animation issued by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

impl AnimationId {
    /// Raw sequence number; later animations compare greater.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Commands accepted by the map camera.
///
/// Starting an animation replaces any animation still in flight. The
/// platform reports completion through
/// [`SelectionController::camera_settled`] with the same id.
pub trait CameraControl {
    /// Animate the viewport to `region` over `duration`.
    fn animate_to(&self, animation: AnimationId, region: Region, duration: Duration);
}

/// Commands accepted by the detail panel.
pub trait DetailPanel {
    /// Open the panel over the selected point.
    fn expand(&self);
    /// Close the panel.
    fn collapse(&self);
}

/// Where the controller currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    /// No selection; panel collapsed.
    Idle,
    /// Panel expanding while the camera animates toward `point`.
    Selecting { point: Point, animation: AnimationId },
    /// Panel open and camera settled on `point`.
    Selected { point: Point },
}

impl SelectionState {
    /// The selected point, if any.
    pub const fn point(&self) -> Option<&Point> {
        match self {
            Self::Idle => None,
            Self::Selecting { point, .. } | Self::Selected { point } => Some(point),
        }
    }

    /// Whether the detail panel is (or is becoming) expanded.
    pub const fn panel_expanded(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// State machine owning the single active selection.
pub struct SelectionController {
    camera: Rc<dyn CameraControl>,
    panel: Rc<dyn DetailPanel>,
    latitude_offset: f64,
    delta: f64,
    duration: Duration,
    state: SelectionState,
    restore_region: Option<Region>,
    last_animation: u64,
    lifetime: Lifetime,
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("state", &self.state)
            .field("restore_region", &self.restore_region)
            .finish_non_exhaustive()
    }
}

impl SelectionController {
    /// Build a controller whose commands stop once `lifetime` ends.
    pub fn new(
        camera: Rc<dyn CameraControl>,
        panel: Rc<dyn DetailPanel>,
        config: &MapConfig,
        lifetime: Lifetime,
    ) -> Self {
        Self {
            camera,
            panel,
            latitude_offset: config.selection_latitude_offset,
            delta: config.selection_delta,
            duration: config.animation_duration,
            state: SelectionState::Idle,
            restore_region: None,
            last_animation: 0,
            lifetime,
        }
    }

    /// Current state.
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The selected point, if any.
    pub const fn selected(&self) -> Option<&Point> {
        self.state.point()
    }

    /// Viewport framing `point` with the marker clear of the panel.
    pub fn focus_region(&self, point: &Point) -> Region {
        Region {
            latitude: point.latitude - self.latitude_offset,
            longitude: point.longitude,
            latitude_delta: self.delta,
            longitude_delta: self.delta,
        }
    }

    /// Select `point`, replacing any current selection.
    ///
    /// `viewport` is remembered as the restore target only when nothing was
    /// selected before. Returns `None` once the lifetime has ended.
    pub fn select_point(&mut self, point: Point, viewport: Region) -> Option<AnimationId> {
        if !self.lifetime.is_alive() {
            return None;
        }
        let was_idle = matches!(self.state, SelectionState::Idle);
        if was_idle {
            self.restore_region = Some(viewport);
        }

        let animation = self.next_animation();
        let target = self.focus_region(&point);
        debug!("selecting point {} ({})", point.id, point.name);
        self.state = SelectionState::Selecting { point, animation };
        self.camera.animate_to(animation, target, self.duration);
        if was_idle {
            self.panel.expand();
        }
        Some(animation)
    }

    /// Record that the camera finished `animation`.
    ///
    /// Only the latest selection animation moves `Selecting` to `Selected`;
    /// anything else is stale and ignored.
    pub fn camera_settled(&mut self, animation: AnimationId) -> bool {
        if !self.lifetime.is_alive() {
            return false;
        }
        let SelectionState::Selecting {
            point,
            animation: pending,
        } = &self.state
        else {
            return false;
        };
        if *pending != animation {
            return false;
        }
        self.state = SelectionState::Selected {
            point: point.clone(),
        };
        true
    }

    /// Clear the selection. A no-op when already idle.
    pub fn close(&mut self) -> bool {
        if !self.lifetime.is_alive() || matches!(self.state, SelectionState::Idle) {
            return false;
        }
        self.state = SelectionState::Idle;
        if let Some(region) = self.restore_region.take() {
            let animation = self.next_animation();
            self.camera.animate_to(animation, region, self.duration);
        }
        self.panel.collapse();
        true
    }

    fn next_animation(&mut self) -> AnimationId {
        self.last_animation += 1;
        AnimationId(self.last_animation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CommandLog, MapCommand, sample_points};
    use crate::DEFAULT_REGION;
    use rstest::{fixture, rstest};

    struct Harness {
        log: CommandLog,
        lifetime: Lifetime,
        controller: SelectionController,
    }

    #[fixture]
    fn harness() -> Harness {
        let log = CommandLog::default();
        let lifetime = Lifetime::new();
        let controller = SelectionController::new(
            Rc::new(log.clone()),
            Rc::new(log.clone()),
            &MapConfig::default(),
            lifetime.clone(),
        );
        Harness {
            log,
            lifetime,
            controller,
        }
    }

    fn first() -> Point {
        sample_points().remove(0)
    }

    fn second() -> Point {
        sample_points().remove(1)
    }

    #[rstest]
    fn select_animates_with_offset_and_expands(mut harness: Harness) {
        let animation = harness
            .controller
            .select_point(first(), DEFAULT_REGION)
            .expect("alive");

        let target = harness.controller.focus_region(&first());
        assert!(target.latitude < first().latitude);
        assert_eq!(
            harness.log.commands(),
            [
                MapCommand::Animate(animation, target),
                MapCommand::Expand,
            ]
        );
        assert!(matches!(
            harness.controller.state(),
            SelectionState::Selecting { .. }
        ));
    }

    #[rstest]
    fn settling_completes_the_selection(mut harness: Harness) {
        let animation = harness
            .controller
            .select_point(first(), DEFAULT_REGION)
            .expect("alive");
        assert!(harness.controller.camera_settled(animation));
        assert_eq!(
            harness.controller.state(),
            &SelectionState::Selected { point: first() }
        );
    }

    #[rstest]
    fn reselecting_replaces_without_idle(mut harness: Harness) {
        let stale = harness
            .controller
            .select_point(first(), DEFAULT_REGION)
            .expect("alive");
        let fresh = harness
            .controller
            .select_point(second(), DEFAULT_REGION)
            .expect("alive");

        assert!(!harness.controller.camera_settled(stale));
        assert!(harness.controller.camera_settled(fresh));
        assert_eq!(harness.controller.selected(), Some(&second()));
        let commands = harness.log.commands();
        assert!(!commands.contains(&MapCommand::Collapse));
        assert_eq!(
            commands
                .iter()
                .filter(|command| **command == MapCommand::Expand)
                .count(),
            1
        );
    }

    #[rstest]
    fn close_restores_the_pre_selection_region(mut harness: Harness) {
        harness.controller.select_point(first(), DEFAULT_REGION);
        harness.controller.select_point(second(), DEFAULT_REGION);
        harness.log.clear();

        assert!(harness.controller.close());

        let commands = harness.log.commands();
        assert!(matches!(
            commands.as_slice(),
            [MapCommand::Animate(_, region), MapCommand::Collapse] if *region == DEFAULT_REGION
        ));
        assert_eq!(harness.controller.state(), &SelectionState::Idle);
    }

    #[rstest]
    fn close_is_idempotent(mut harness: Harness) {
        harness.controller.select_point(first(), DEFAULT_REGION);
        assert!(harness.controller.close());
        let after_first = harness.log.commands().len();

        assert!(!harness.controller.close());

        assert_eq!(harness.log.commands().len(), after_first);
        assert_eq!(harness.controller.state(), &SelectionState::Idle);
    }

    #[rstest]
    fn ended_lifetime_silences_commands(mut harness: Harness) {
        harness.lifetime.end();
        assert_eq!(harness.controller.select_point(first(), DEFAULT_REGION), None);
        assert!(!harness.controller.close());
        assert!(harness.log.commands().is_empty());
    }
}
