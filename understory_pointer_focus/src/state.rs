// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer focus state.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use glam::Vec3;

use crate::types::{
    FocusDetails, FocusResult, Layer, OverlayHitState, PointerId, RaySegment, SceneHit,
};

/// Layer and distance of the 3D hit that produced the current target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneHitInfo {
    /// Layer of the object that was hit.
    pub layer: Layer,
    /// Distance from the segment origin.
    pub distance: f32,
}

/// Focus state of one registered pointer.
///
/// The state refers to its pointer weakly; the host owns pointer lifetime.
/// Two states are equal when they belong to the same pointer id.
///
/// After a pointer has been updated in a tick, [`previous_target`] holds the
/// value [`current_target`] had before that tick.
///
/// [`previous_target`]: PointerFocusState::previous_target
/// [`current_target`]: PointerFocusState::current_target
pub struct PointerFocusState<K, P> {
    id: PointerId,
    pointer: Weak<RefCell<P>>,
    pub(crate) current: Option<K>,
    pub(crate) previous: Option<K>,
    pub(crate) point: Vec3,
    pub(crate) normal: Vec3,
    pub(crate) start_point: Vec3,
    pub(crate) ray_step_index: usize,
    pub(crate) scene_hit: Option<SceneHitInfo>,
    pub(crate) overlay: Option<OverlayHitState>,
}

impl<K: fmt::Debug, P> fmt::Debug for PointerFocusState<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerFocusState")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("start_point", &self.start_point)
            .field("ray_step_index", &self.ray_step_index)
            .field("scene_hit", &self.scene_hit)
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

impl<K, P> PartialEq for PointerFocusState<K, P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K, P> Eq for PointerFocusState<K, P> {}

impl<K: Copy, P> PointerFocusState<K, P> {
    pub(crate) fn new(id: PointerId, pointer: &Rc<RefCell<P>>) -> Self {
        Self {
            id,
            pointer: Rc::downgrade(pointer),
            current: None,
            previous: None,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            start_point: Vec3::ZERO,
            ray_step_index: 0,
            scene_hit: None,
            overlay: None,
        }
    }

    /// Identity of the pointer.
    #[must_use]
    pub fn id(&self) -> PointerId {
        self.id
    }

    /// The pointer, if the host still holds it.
    #[must_use]
    pub fn pointer(&self) -> Option<Rc<RefCell<P>>> {
        self.pointer.upgrade()
    }

    /// The object the pointer focuses now.
    #[must_use]
    pub fn current_target(&self) -> Option<K> {
        self.current
    }

    /// The object the pointer focused before the last update.
    #[must_use]
    pub fn previous_target(&self) -> Option<K> {
        self.previous
    }

    /// World-space end point of the pointer.
    #[must_use]
    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// Normal at [`point`](Self::point).
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Origin of the ray segment that produced the last result.
    #[must_use]
    pub fn start_point(&self) -> Vec3 {
        self.start_point
    }

    /// Index of the ray segment that produced the last result.
    #[must_use]
    pub fn ray_step_index(&self) -> usize {
        self.ray_step_index
    }

    /// Layer and distance of the 3D hit behind the current target.
    ///
    /// `None` when the target came from the overlay or nothing was hit.
    #[must_use]
    pub fn scene_hit(&self) -> Option<SceneHitInfo> {
        self.scene_hit
    }

    /// The last overlay hit seen by this pointer.
    #[must_use]
    pub fn overlay_hit(&self) -> Option<OverlayHitState> {
        self.overlay
    }

    /// Current target, end point and normal.
    #[must_use]
    pub fn details(&self) -> FocusDetails<K> {
        FocusDetails {
            target: self.current,
            point: self.point,
            normal: self.normal,
        }
    }

    /// Everything published back to the pointer.
    #[must_use]
    pub fn result(&self) -> FocusResult<K> {
        FocusResult {
            details: self.details(),
            previous: self.previous,
            start_point: self.start_point,
            ray_step_index: self.ray_step_index,
        }
    }

    /// Clear the current target, rolling it into the previous one so that the
    /// object it left still receives an exit.
    pub(crate) fn clear_target(&mut self) {
        self.previous = self.current;
        self.current = None;
        self.scene_hit = None;
    }

    /// Keep the current target for another tick.
    pub(crate) fn hold_target(&mut self) {
        self.previous = self.current;
    }

    pub(crate) fn update_scene_hit(&mut self, hit: &SceneHit<K>, step: &RaySegment, index: usize) {
        self.previous = self.current;
        self.current = Some(hit.target);
        self.point = hit.point;
        self.normal = hit.normal;
        self.start_point = step.origin;
        self.ray_step_index = index;
        self.scene_hit = Some(SceneHitInfo {
            layer: hit.layer,
            distance: hit.distance,
        });
    }

    /// Nothing was hit: end at the terminus of the last segment, facing back
    /// along it.
    pub(crate) fn update_miss(&mut self, last: &RaySegment, index: usize) {
        self.previous = self.current;
        self.current = None;
        self.point = last.terminus();
        self.normal = -last.direction;
        self.start_point = last.origin;
        self.ray_step_index = index;
        self.scene_hit = None;
    }

    /// Replace the 3D result with an overlay element.
    ///
    /// `previous` is left alone; the scene pass already rolled it this tick.
    /// The replaced 3D hit is forgotten.
    pub(crate) fn update_overlay_hit(
        &mut self,
        target: K,
        point: Vec3,
        normal: Vec3,
        step: &RaySegment,
        index: usize,
    ) {
        self.current = Some(target);
        self.point = point;
        self.normal = normal;
        self.start_point = step.origin;
        self.ray_step_index = index;
        self.scene_hit = None;
    }
}
