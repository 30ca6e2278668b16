// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay (2D UI) raycasting and its override rule.
//!
//! ## Overview
//!
//! The overlay is hit-tested through a dedicated [`OverlayViewpoint`]: a small
//! virtual camera that is moved to each candidate ray segment's origin and
//! turned along its direction, so the pointer always queries the overlay at
//! the center of the viewpoint.
//!
//! ## Override rule
//!
//! When the overlay reports a hit, it replaces the 3D result if:
//!
//! - the pointer has no 3D target, or
//! - there are several priority entries and the 3D hit's entry index is
//!   greater than the overlay hit's index (an overlay layer that appears in no
//!   entry counts as being ahead of every entry), or
//! - the indices are equal, or there is a single entry, and the 3D hit is
//!   farther than the overlay hit.
//!
//! The replaced point is the overlay hit's screen position unprojected through
//! the viewpoint at the overlay hit's depth; the normal faces against the
//! overlay element's forward vector.

use glam::Vec3;
use kurbo::Point;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use tracing::trace;

use crate::state::{PointerFocusState, SceneHitInfo};
use crate::types::{LayerPriorities, OverlayHit, OverlayHitState, RaySegment};

/// Overlay hit-testing answered by the host UI layer.
pub trait OverlayRaycaster<K> {
    /// The topmost overlay element under `position`, as seen from `viewpoint`.
    ///
    /// `priorities` lets the host order competing overlay elements by layer.
    fn raycast(
        &self,
        viewpoint: &OverlayViewpoint,
        position: Point,
        priorities: &LayerPriorities,
    ) -> Option<OverlayHit<K>>;
}

/// An overlay that never reports a hit; used when the host has no UI layer.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOverlay;

impl<K> OverlayRaycaster<K> for NoOverlay {
    fn raycast(
        &self,
        _viewpoint: &OverlayViewpoint,
        _position: Point,
        _priorities: &LayerPriorities,
    ) -> Option<OverlayHit<K>> {
        None
    }
}

/// Projection settings of the overlay viewpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewpointConfig {
    /// Width of the virtual screen in pixels.
    pub pixel_width: u32,
    /// Height of the virtual screen in pixels.
    pub pixel_height: u32,
    /// Vertical field of view in degrees.
    pub vertical_fov_degrees: f32,
    /// Near clip distance.
    pub near_clip: f32,
    /// Far clip distance.
    pub far_clip: f32,
}

impl Default for ViewpointConfig {
    fn default() -> Self {
        Self {
            pixel_width: 128,
            pixel_height: 128,
            vertical_fov_degrees: 60.0,
            near_clip: 0.01,
            far_clip: 1000.0,
        }
    }
}

/// Virtual camera used to query the overlay from a ray segment.
///
/// Screen space has its origin at the bottom-left corner with `y` up.
/// A single viewpoint is reused for every pointer, one segment at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayViewpoint {
    config: ViewpointConfig,
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for OverlayViewpoint {
    fn default() -> Self {
        Self::new(ViewpointConfig::default())
    }
}

impl OverlayViewpoint {
    /// Create a viewpoint at the origin looking along `+Z`.
    #[must_use]
    pub fn new(config: ViewpointConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
        }
    }

    /// Projection settings.
    #[must_use]
    pub fn config(&self) -> &ViewpointConfig {
        &self.config
    }

    /// Replace the projection settings.
    pub fn set_config(&mut self, config: ViewpointConfig) {
        self.config = config;
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit viewing direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit screen-right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit screen-up direction.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Move to `origin` and look along `direction` (assumed normalized).
    ///
    /// The screen's up vector follows world `+Y` unless `direction` is
    /// (nearly) vertical, in which case world `+Z` is used instead.
    pub fn reposition(&mut self, origin: Vec3, direction: Vec3) {
        let reference = if direction.dot(Vec3::Y).abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let right = reference.cross(direction).normalize_or_zero();
        self.position = origin;
        self.forward = direction;
        self.right = right;
        self.up = direction.cross(right);
    }

    /// Center of the virtual screen.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.config.pixel_width) * 0.5,
            f64::from(self.config.pixel_height) * 0.5,
        )
    }

    fn half_extents(&self, depth: f32) -> (f32, f32) {
        let half_fov = self.config.vertical_fov_degrees.to_radians() * 0.5;
        let half_height = half_fov.tan() * depth;
        let aspect = self.config.pixel_width as f32 / self.config.pixel_height.max(1) as f32;
        (half_height * aspect, half_height)
    }

    /// World-space point at `depth` in front of the viewpoint under `screen`.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point, depth: f32) -> Vec3 {
        let (half_width, half_height) = self.half_extents(depth);
        let (ndc_x, ndc_y) = self.screen_to_ndc(screen);
        self.position
            + self.forward * depth
            + self.right * (ndc_x * half_width)
            + self.up * (ndc_y * half_height)
    }

    /// Screen position and depth of `world`, or `None` outside the clip range.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec3) -> Option<(Point, f32)> {
        let rel = world - self.position;
        let depth = rel.dot(self.forward);
        if depth < self.config.near_clip || depth > self.config.far_clip {
            return None;
        }
        let (half_width, half_height) = self.half_extents(depth);
        let ndc_x = rel.dot(self.right) / half_width;
        let ndc_y = rel.dot(self.up) / half_height;
        let x = (f64::from(ndc_x) + 1.0) * 0.5 * f64::from(self.config.pixel_width);
        let y = (f64::from(ndc_y) + 1.0) * 0.5 * f64::from(self.config.pixel_height);
        Some((Point::new(x, y), depth))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "normalized device coordinates fit comfortably in f32"
    )]
    fn screen_to_ndc(&self, screen: Point) -> (f32, f32) {
        let x = screen.x / f64::from(self.config.pixel_width.max(1)) * 2.0 - 1.0;
        let y = screen.y / f64::from(self.config.pixel_height.max(1)) * 2.0 - 1.0;
        (x as f32, y as f32)
    }
}

/// Whether an overlay hit replaces the current 3D result.
#[must_use]
pub fn overlay_overrides<K>(
    scene_hit: Option<SceneHitInfo>,
    hit: &OverlayHit<K>,
    priorities: &LayerPriorities,
) -> bool {
    let Some(scene_hit) = scene_hit else {
        return true;
    };
    if !priorities.is_single() {
        // `None` orders before every index, so an overlay layer missing from
        // the list always outranks the 3D hit.
        let overlay_index = priorities.index_of(hit.layer);
        let scene_index = priorities.index_of(scene_hit.layer);
        if scene_index > overlay_index {
            return true;
        }
        if scene_index < overlay_index {
            return false;
        }
    }
    scene_hit.distance > hit.distance
}

/// Hit-test the overlay along `rays` and apply the override rule to `state`.
///
/// Segments are tried from the one that won the 3D pass (the first segment if
/// the 3D pass missed); the first segment with an overlay hit is used. The
/// state's cached overlay hit is refreshed either way.
///
/// Returns whether the overlay result replaced the 3D result.
pub fn cast_overlay<K, P, O>(
    state: &mut PointerFocusState<K, P>,
    rays: &[RaySegment],
    priorities: &LayerPriorities,
    overlay: &O,
    viewpoint: &mut OverlayViewpoint,
) -> bool
where
    K: Copy,
    O: OverlayRaycaster<K> + ?Sized,
{
    let start = if state.scene_hit.is_some() {
        state.ray_step_index
    } else {
        0
    };
    let mut found = None;
    for (index, step) in rays.iter().enumerate().skip(start) {
        viewpoint.reposition(step.origin, step.direction);
        if let Some(hit) = overlay.raycast(viewpoint, viewpoint.center(), priorities) {
            found = Some((index, step, hit));
            break;
        }
    }

    let Some((index, step, hit)) = found else {
        state.overlay = None;
        return false;
    };
    state.overlay = Some(OverlayHitState {
        screen_position: hit.screen_position,
        distance: hit.distance,
    });

    let scene_hit = if state.current.is_some() {
        state.scene_hit
    } else {
        None
    };
    if !overlay_overrides(scene_hit, &hit, priorities) {
        return false;
    }

    // The viewpoint still sits on the winning segment.
    let point = viewpoint.screen_to_world(hit.screen_position, hit.distance);
    trace!(
        pointer = state.id().get(),
        step = index,
        distance = hit.distance,
        "overlay hit overrides scene"
    );
    state.update_overlay_hit(hit.target, point, -hit.forward, step, index);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{Panel, PanelOverlay, pointer_state};
    use crate::types::{Layer, LayerMask, SceneHit};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn forward_ray() -> RaySegment {
        RaySegment::new(Vec3::ZERO, Vec3::Z, 10.0)
    }

    fn scene_hit(target: u32, layer: Layer, distance: f32) -> SceneHit<u32> {
        SceneHit {
            target,
            layer,
            point: Vec3::new(0.0, 0.0, distance),
            normal: Vec3::NEG_Z,
            distance,
        }
    }

    fn overlay_hit(layer: Layer, distance: f32) -> OverlayHit<u32> {
        OverlayHit {
            target: 100,
            layer,
            screen_position: Point::new(64.0, 64.0),
            distance,
            forward: Vec3::Z,
        }
    }

    #[test]
    fn viewpoint_basis_follows_direction() {
        let mut v = OverlayViewpoint::default();
        v.reposition(Vec3::new(1.0, 2.0, 3.0), Vec3::X);
        assert_eq!(v.position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(v.forward(), Vec3::X));
        assert!(approx(v.up(), Vec3::Y));
        assert!(approx(v.right(), Vec3::NEG_Z));

        v.reposition(Vec3::ZERO, Vec3::Y);
        assert!(approx(v.right().cross(v.up()), Vec3::Y));
        assert!(approx(v.up(), Vec3::Z));
    }

    #[test]
    fn center_unprojects_along_forward() {
        let mut v = OverlayViewpoint::default();
        v.reposition(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        let p = v.screen_to_world(v.center(), 4.0);
        assert!(approx(p, Vec3::new(0.0, 1.0, 4.0)));
    }

    #[test]
    fn screen_round_trips_through_world() {
        let mut v = OverlayViewpoint::default();
        v.reposition(Vec3::ZERO, Vec3::Z);
        let world = v.screen_to_world(Point::new(96.0, 32.0), 3.0);
        assert!(world.x > 0.0 && world.y < 0.0);
        let (screen, depth) = v.world_to_screen(world).unwrap();
        assert!((screen.x - 96.0).abs() < 1e-3);
        assert!((screen.y - 32.0).abs() < 1e-3);
        assert!((depth - 3.0).abs() < 1e-5);
        assert!(v.world_to_screen(Vec3::new(0.0, 0.0, -1.0)).is_none());
        assert!(v.world_to_screen(Vec3::new(0.0, 0.0, 2000.0)).is_none());
    }

    #[test]
    fn no_scene_target_always_overrides() {
        let priorities = LayerPriorities::default();
        assert!(overlay_overrides(
            None,
            &overlay_hit(Layer::UI, 50.0),
            &priorities
        ));
    }

    #[test]
    fn single_priority_nearest_wins() {
        let priorities = LayerPriorities::default();
        let near = SceneHitInfo {
            layer: Layer::DEFAULT,
            distance: 1.0,
        };
        let far = SceneHitInfo {
            layer: Layer::DEFAULT,
            distance: 5.0,
        };
        let hit = overlay_hit(Layer::UI, 3.0);
        assert!(!overlay_overrides(Some(near), &hit, &priorities));
        assert!(overlay_overrides(Some(far), &hit, &priorities));
    }

    #[test]
    fn more_prioritized_overlay_overrides_nearer_scene() {
        let priorities = LayerPriorities::new([LayerMask::UI, LayerMask::DEFAULT]).unwrap();
        let scene = SceneHitInfo {
            layer: Layer::DEFAULT,
            distance: 1.0,
        };
        assert!(overlay_overrides(
            Some(scene),
            &overlay_hit(Layer::UI, 9.0),
            &priorities
        ));
    }

    #[test]
    fn more_prioritized_scene_keeps_target() {
        let priorities = LayerPriorities::new([LayerMask::DEFAULT, LayerMask::UI]).unwrap();
        let scene = SceneHitInfo {
            layer: Layer::DEFAULT,
            distance: 9.0,
        };
        assert!(!overlay_overrides(
            Some(scene),
            &overlay_hit(Layer::UI, 1.0),
            &priorities
        ));
    }

    #[test]
    fn equal_priority_index_falls_back_to_distance() {
        let priorities =
            LayerPriorities::new([LayerMask::DEFAULT | LayerMask::UI, LayerMask::WATER]).unwrap();
        let scene = SceneHitInfo {
            layer: Layer::DEFAULT,
            distance: 2.0,
        };
        assert!(!overlay_overrides(
            Some(scene),
            &overlay_hit(Layer::UI, 3.0),
            &priorities
        ));
        assert!(overlay_overrides(
            Some(scene),
            &overlay_hit(Layer::UI, 1.0),
            &priorities
        ));
    }

    // Known quirk: the index comparison treats an overlay layer that is in no
    // priority entry as more prioritized than any listed layer.
    #[test]
    fn unlisted_overlay_layer_overrides_any_scene_hit() {
        let priorities = LayerPriorities::new([LayerMask::DEFAULT, LayerMask::WATER]).unwrap();
        let scene = SceneHitInfo {
            layer: Layer::DEFAULT,
            distance: 0.5,
        };
        assert!(overlay_overrides(
            Some(scene),
            &overlay_hit(Layer::UI, 50.0),
            &priorities
        ));
    }

    #[test]
    fn overlay_replaces_missed_scene() {
        let overlay = PanelOverlay::new().with_panel(Panel::facing_z(100, Layer::UI, 4.0, 1.0));
        let (_p, mut state) = pointer_state(1);
        state.update_miss(&forward_ray(), 0);
        let mut viewpoint = OverlayViewpoint::default();

        let replaced = cast_overlay(
            &mut state,
            &[forward_ray()],
            &LayerPriorities::default(),
            &overlay,
            &mut viewpoint,
        );

        assert!(replaced);
        assert_eq!(state.current_target(), Some(100));
        assert!(approx(state.point(), Vec3::new(0.0, 0.0, 4.0)));
        assert!(approx(state.normal(), Vec3::NEG_Z));
        assert!((state.overlay_hit().unwrap().distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn nearer_scene_hit_is_kept() {
        let overlay = PanelOverlay::new().with_panel(Panel::facing_z(100, Layer::UI, 4.0, 1.0));
        let (_p, mut state) = pointer_state(1);
        state.update_scene_hit(&scene_hit(7, Layer::DEFAULT, 2.0), &forward_ray(), 0);
        let mut viewpoint = OverlayViewpoint::default();

        let replaced = cast_overlay(
            &mut state,
            &[forward_ray()],
            &LayerPriorities::default(),
            &overlay,
            &mut viewpoint,
        );

        assert!(!replaced);
        assert_eq!(state.current_target(), Some(7));
        // The overlay hit is still cached.
        assert!(state.overlay_hit().is_some());
    }

    #[test]
    fn override_keeps_previous_target() {
        let overlay = PanelOverlay::new().with_panel(Panel::facing_z(100, Layer::UI, 4.0, 1.0));
        let (_p, mut state) = pointer_state(1);
        state.update_scene_hit(&scene_hit(7, Layer::DEFAULT, 2.0), &forward_ray(), 0);
        state.update_scene_hit(&scene_hit(8, Layer::DEFAULT, 6.0), &forward_ray(), 0);
        let mut viewpoint = OverlayViewpoint::default();

        assert!(cast_overlay(
            &mut state,
            &[forward_ray()],
            &LayerPriorities::default(),
            &overlay,
            &mut viewpoint,
        ));
        assert_eq!(state.previous_target(), Some(7));
        assert_eq!(state.current_target(), Some(100));
        assert!(state.scene_hit().is_none());
    }

    #[test]
    fn overlay_miss_clears_cache() {
        let overlay = PanelOverlay::new();
        let (_p, mut state) = pointer_state(1);
        state.overlay = Some(OverlayHitState::default());
        let mut viewpoint = OverlayViewpoint::default();
        assert!(!cast_overlay(
            &mut state,
            &[forward_ray()],
            &LayerPriorities::default(),
            &overlay,
            &mut viewpoint,
        ));
        assert!(state.overlay_hit().is_none());
    }

    #[test]
    fn later_segment_can_hit_overlay() {
        let rays = [
            RaySegment::new(Vec3::ZERO, Vec3::X, 2.0),
            RaySegment::new(Vec3::new(2.0, 0.0, 0.0), Vec3::Z, 10.0),
        ];
        let overlay = PanelOverlay::new().with_panel(Panel::facing_z(100, Layer::UI, 5.0, 3.0));
        let (_p, mut state) = pointer_state(1);
        state.update_miss(&rays[1], 1);
        let mut viewpoint = OverlayViewpoint::default();

        assert!(cast_overlay(
            &mut state,
            &rays,
            &LayerPriorities::default(),
            &overlay,
            &mut viewpoint,
        ));
        assert_eq!(state.ray_step_index(), 1);
        assert_eq!(state.start_point(), Vec3::new(2.0, 0.0, 0.0));
        assert!(approx(state.point(), Vec3::new(2.0, 0.0, 5.0)));
        assert_eq!(viewpoint.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn no_overlay_never_hits() {
        let (_p, mut state) = pointer_state(1);
        let mut viewpoint = OverlayViewpoint::default();
        assert!(!cast_overlay(
            &mut state,
            &[forward_ray()],
            &LayerPriorities::default(),
            &NoOverlay,
            &mut viewpoint,
        ));
    }
}
