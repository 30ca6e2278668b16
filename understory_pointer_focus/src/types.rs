// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core value types: pointer identity, ray segments, layers and hit records.

use core::num::NonZeroU64;

use bitflags::bitflags;
use glam::Vec3;
use kurbo::Point;
use smallvec::SmallVec;

use crate::error::FocusError;

/// Stable, non-zero identity of a registered pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(NonZeroU64);

impl PointerId {
    /// Wrap a raw identifier, rejecting the reserved value `0`.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// One bounded piece of a pointer's logical ray.
///
/// `direction` is expected to be normalized. It is used as given: distances,
/// the terminus and the miss normal all assume unit length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaySegment {
    /// Start of the segment in world space.
    pub origin: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    /// Length of the segment along `direction`.
    pub length: f32,
}

impl RaySegment {
    /// Create a segment from an origin, a unit direction and a length.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3, length: f32) -> Self {
        Self {
            origin,
            direction,
            length,
        }
    }

    /// Create the segment running from `start` to `end`.
    ///
    /// A degenerate segment (`start == end`) gets a zero direction.
    #[must_use]
    pub fn between(start: Vec3, end: Vec3) -> Self {
        let delta = end - start;
        let length = delta.length();
        let direction = if length > 0.0 {
            delta / length
        } else {
            Vec3::ZERO
        };
        Self {
            origin: start,
            direction,
            length,
        }
    }

    /// Point at `distance` along the segment's direction.
    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// End point of the segment.
    #[must_use]
    pub fn terminus(&self) -> Vec3 {
        self.at(self.length)
    }
}

/// A single scene layer, `0..32`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer(u8);

impl Layer {
    /// Number of distinct layers.
    pub const COUNT: u8 = 32;
    /// The layer objects live on unless told otherwise.
    pub const DEFAULT: Self = Self(0);
    /// Objects on this layer are skipped by the all-hits scene query.
    pub const IGNORE_RAYCAST: Self = Self(2);
    /// Conventional layer for overlay UI.
    pub const UI: Self = Self(5);

    /// Create a layer, rejecting indices `>= 32`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The layer index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// A mask containing only this layer.
    #[must_use]
    pub const fn mask(self) -> LayerMask {
        LayerMask::from_bits_retain(1 << self.0)
    }
}

bitflags! {
    /// A set of [`Layer`]s; used as one priority class.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct LayerMask: u32 {
        /// Layer 0.
        const DEFAULT = 1 << 0;
        /// Layer 1.
        const TRANSPARENT_FX = 1 << 1;
        /// Layer 2.
        const IGNORE_RAYCAST = 1 << 2;
        /// Layer 4.
        const WATER = 1 << 4;
        /// Layer 5.
        const UI = 1 << 5;
        // User layers are unnamed but valid.
        const _ = !0;
    }
}

impl LayerMask {
    /// Every layer except [`Layer::IGNORE_RAYCAST`].
    pub const DEFAULT_RAYCAST_LAYERS: Self = Self::from_bits_retain(!Self::IGNORE_RAYCAST.bits());

    /// Whether `layer` is part of this mask.
    #[must_use]
    pub const fn contains_layer(self, layer: Layer) -> bool {
        self.bits() & layer.mask().bits() != 0
    }
}

/// Ordered, non-empty list of layer masks.
///
/// Earlier entries are more prioritized. When several objects are hit, the
/// first entry that matches any of them wins; within that entry the nearest
/// hit wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerPriorities(SmallVec<[LayerMask; 4]>);

impl LayerPriorities {
    /// A list with one entry.
    #[must_use]
    pub fn single(mask: LayerMask) -> Self {
        let mut masks = SmallVec::new();
        masks.push(mask);
        Self(masks)
    }

    /// Build a list from masks in priority order.
    pub fn new(masks: impl IntoIterator<Item = LayerMask>) -> Result<Self, FocusError> {
        let masks: SmallVec<[LayerMask; 4]> = masks.into_iter().collect();
        if masks.is_empty() {
            return Err(FocusError::EmptyPriorities);
        }
        Ok(Self(masks))
    }

    /// The masks, most prioritized first.
    #[must_use]
    pub fn as_slice(&self) -> &[LayerMask] {
        &self.0
    }

    /// Whether there is exactly one entry.
    ///
    /// With a single entry no layer disambiguation is needed: the nearest
    /// hit on that mask wins.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    /// The most prioritized mask.
    #[must_use]
    pub fn first(&self) -> LayerMask {
        self.0[0]
    }

    /// Index of the first entry containing `layer`.
    #[must_use]
    pub fn index_of(&self, layer: Layer) -> Option<usize> {
        self.0.iter().position(|mask| mask.contains_layer(layer))
    }
}

impl Default for LayerPriorities {
    fn default() -> Self {
        Self::single(LayerMask::DEFAULT_RAYCAST_LAYERS)
    }
}

/// One intersection reported by the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneHit<K> {
    /// The object that was hit.
    pub target: K,
    /// Layer of the object that was hit.
    pub layer: Layer,
    /// World-space intersection point.
    pub point: Vec3,
    /// Surface normal at `point`.
    pub normal: Vec3,
    /// Distance from the segment origin to `point`.
    pub distance: f32,
}

/// The topmost overlay element under a screen position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayHit<K> {
    /// The overlay element that was hit.
    pub target: K,
    /// Layer of the overlay element.
    pub layer: Layer,
    /// Screen position of the hit in the viewpoint's pixel space.
    pub screen_position: Point,
    /// Depth of the hit in front of the viewpoint.
    pub distance: f32,
    /// World-space forward vector of the element.
    pub forward: Vec3,
}

/// Last overlay hit cached for a pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OverlayHitState {
    /// Screen position of the hit.
    pub screen_position: Point,
    /// Depth of the hit.
    pub distance: f32,
}

/// Where a pointer is focused.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FocusDetails<K> {
    /// The focused object, if any.
    pub target: Option<K>,
    /// World-space end point of the pointer.
    pub point: Vec3,
    /// Normal at `point`.
    pub normal: Vec3,
}

/// Resolution published back to a pointer after its raycast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FocusResult<K> {
    /// Current target, end point and normal.
    pub details: FocusDetails<K>,
    /// The target focused before this tick.
    pub previous: Option<K>,
    /// Origin of the ray segment that produced the result.
    pub start_point: Vec3,
    /// Index of the ray segment that produced the result.
    pub ray_step_index: usize,
}
