// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small scene, overlay and pointer fixtures for unit tests.

extern crate std;

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use glam::Vec3;
use kurbo::Point;

use crate::overlay::{OverlayRaycaster, OverlayViewpoint};
use crate::pointer::Pointer;
use crate::state::PointerFocusState;
use crate::types::{
    FocusResult, Layer, LayerMask, LayerPriorities, OverlayHit, PointerId, RaySegment, SceneHit,
};

/// A pointer with scripted flags that records its lifecycle calls.
#[derive(Debug)]
pub(crate) struct TestPointer {
    pub(crate) id: u64,
    pub(crate) rays: Vec<RaySegment>,
    pub(crate) enabled: bool,
    pub(crate) locked: bool,
    pub(crate) priorities: Option<LayerPriorities>,
    pub(crate) extent: Option<f32>,
    pub(crate) result: Option<FocusResult<u32>>,
    /// Rays installed by the pre-raycast hook, if any.
    pub(crate) rays_on_pre: Option<Vec<RaySegment>>,
    pub(crate) log: Vec<&'static str>,
}

impl TestPointer {
    /// A pointer looking down `+Z` from the origin, 10 units long.
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            rays: vec![RaySegment::new(Vec3::ZERO, Vec3::Z, 10.0)],
            enabled: true,
            locked: false,
            priorities: None,
            extent: None,
            result: None,
            rays_on_pre: None,
            log: Vec::new(),
        }
    }

    pub(crate) fn aim(&mut self, origin: Vec3, direction: Vec3) {
        self.rays = vec![RaySegment::new(origin, direction, 10.0)];
    }
}

impl Pointer<u32> for TestPointer {
    fn pointer_id(&self) -> u64 {
        self.id
    }

    fn rays(&self) -> &[RaySegment] {
        &self.rays
    }

    fn is_interaction_enabled(&self) -> bool {
        self.enabled
    }

    fn is_focus_locked(&self) -> bool {
        self.locked
    }

    fn priority_override(&self) -> Option<&LayerPriorities> {
        self.priorities.as_ref()
    }

    fn extent_override(&self) -> Option<f32> {
        self.extent
    }

    fn on_pre_raycast(&mut self) {
        self.log.push("pre");
        if let Some(rays) = &self.rays_on_pre {
            self.rays.clone_from(rays);
        }
    }

    fn on_post_raycast(&mut self) {
        self.log.push("post");
    }

    fn set_result(&mut self, result: &FocusResult<u32>) {
        self.log.push("result");
        self.result = Some(*result);
    }
}

pub(crate) fn shared_pointer(id: u64) -> Rc<RefCell<TestPointer>> {
    Rc::new(RefCell::new(TestPointer::new(id)))
}

/// A fresh pointer and a focus state that refers to it.
pub(crate) fn pointer_state(
    id: u64,
) -> (
    Rc<RefCell<TestPointer>>,
    PointerFocusState<u32, TestPointer>,
) {
    let pointer = shared_pointer(id);
    let state = PointerFocusState::new(PointerId::new(id).unwrap(), &pointer);
    (pointer, state)
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Sphere {
    target: u32,
    layer: Layer,
    center: Vec3,
    radius: f32,
}

impl Sphere {
    fn intersect(&self, ray: &RaySegment, max_distance: f32) -> Option<SceneHit<u32>> {
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction);
        let c = oc.dot(oc) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let mut t = -b - root;
        if t < 0.0 {
            t = -b + root;
        }
        if t < 0.0 || t > max_distance {
            return None;
        }
        let point = ray.at(t);
        Some(SceneHit {
            target: self.target,
            layer: self.layer,
            point,
            normal: (point - self.center) / self.radius,
            distance: t,
        })
    }
}

/// A scene made of spheres.
#[derive(Clone, Debug, Default)]
pub(crate) struct SphereScene {
    spheres: Vec<Sphere>,
}

impl SphereScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_sphere(
        mut self,
        target: u32,
        layer: Layer,
        center: Vec3,
        radius: f32,
    ) -> Self {
        self.spheres.push(Sphere {
            target,
            layer,
            center,
            radius,
        });
        self
    }
}

impl crate::scene::SceneRaycaster<u32> for SphereScene {
    fn raycast(
        &self,
        ray: &RaySegment,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SceneHit<u32>> {
        self.spheres
            .iter()
            .filter(|s| layers.contains_layer(s.layer))
            .filter_map(|s| s.intersect(ray, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn raycast_all(
        &self,
        ray: &RaySegment,
        max_distance: f32,
        layers: LayerMask,
        out: &mut Vec<SceneHit<u32>>,
    ) {
        out.extend(
            self.spheres
                .iter()
                .filter(|s| layers.contains_layer(s.layer))
                .filter_map(|s| s.intersect(ray, max_distance)),
        );
    }
}

/// A square overlay panel lying in a plane of constant `z`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Panel {
    target: u32,
    layer: Layer,
    z: f32,
    half_size: f32,
}

impl Panel {
    /// A panel centered on the `z` axis, facing away from the origin.
    pub(crate) fn facing_z(target: u32, layer: Layer, z: f32, half_size: f32) -> Self {
        Self {
            target,
            layer,
            z,
            half_size,
        }
    }
}

/// An overlay made of panels; the nearest panel under the query wins.
#[derive(Clone, Debug, Default)]
pub(crate) struct PanelOverlay {
    panels: Vec<Panel>,
}

impl PanelOverlay {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }
}

impl OverlayRaycaster<u32> for PanelOverlay {
    fn raycast(
        &self,
        viewpoint: &OverlayViewpoint,
        position: Point,
        _priorities: &LayerPriorities,
    ) -> Option<OverlayHit<u32>> {
        let origin = viewpoint.position();
        let probe = viewpoint.screen_to_world(position, 1.0) - origin;
        if probe.z.abs() < 1e-6 {
            return None;
        }
        self.panels
            .iter()
            .filter_map(|panel| {
                let scale = (panel.z - origin.z) / probe.z;
                let world = origin + probe * scale;
                let inside = world.x.abs() <= panel.half_size && world.y.abs() <= panel.half_size;
                let (screen, depth) = viewpoint.world_to_screen(world)?;
                inside.then_some(OverlayHit {
                    target: panel.target,
                    layer: panel.layer,
                    screen_position: screen,
                    distance: depth,
                    forward: Vec3::Z,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
