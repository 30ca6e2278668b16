// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prioritized 3D raycasting against the host scene.
//!
//! ## Selection
//!
//! - Segments are tried in order; the first segment with a hit wins.
//! - With a single priority entry, one nearest-hit query on that mask is enough.
//! - With several entries, every intersection along the segment is gathered,
//!   the first entry matching any of them is chosen, and the nearest hit in
//!   that entry wins. A farther hit in an earlier entry beats a nearer one in a
//!   later entry.
//! - When no segment hits, the pointer ends at the terminus of the last
//!   segment with the reversed segment direction as its normal.

use alloc::vec::Vec;

use tracing::trace;

use crate::error::FocusError;
use crate::state::PointerFocusState;
use crate::types::{LayerMask, LayerPriorities, RaySegment, SceneHit};

/// Ray intersection queries answered by the host scene.
pub trait SceneRaycaster<K> {
    /// Nearest intersection with an object on `layers` within `max_distance`.
    fn raycast(
        &self,
        ray: &RaySegment,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SceneHit<K>>;

    /// Append every intersection with an object on `layers` within
    /// `max_distance` to `out`, in any order.
    fn raycast_all(
        &self,
        ray: &RaySegment,
        max_distance: f32,
        layers: LayerMask,
        out: &mut Vec<SceneHit<K>>,
    );
}

/// Pick the hit that wins under `priorities`.
///
/// Entries are tried in order; within the first entry that matches any hit,
/// the nearest matching hit is returned. Equal distances keep the earlier hit.
#[must_use]
pub fn prioritized_hit<K: Copy>(
    hits: &[SceneHit<K>],
    priorities: &LayerPriorities,
) -> Option<SceneHit<K>> {
    priorities.as_slice().iter().find_map(|mask| {
        hits.iter()
            .filter(|hit| mask.contains_layer(hit.layer))
            .fold(None, |best: Option<&SceneHit<K>>, hit| match best {
                Some(b) if b.distance <= hit.distance => Some(b),
                _ => Some(hit),
            })
            .copied()
    })
}

/// Raycast a single segment under `priorities`.
///
/// `scratch` is cleared and reused for the all-hits query.
pub fn raycast_step<K, S>(
    scene: &S,
    step: &RaySegment,
    max_distance: f32,
    priorities: &LayerPriorities,
    scratch: &mut Vec<SceneHit<K>>,
) -> Option<SceneHit<K>>
where
    K: Copy,
    S: SceneRaycaster<K> + ?Sized,
{
    if priorities.is_single() {
        return scene.raycast(step, max_distance, priorities.first());
    }
    scratch.clear();
    scene.raycast_all(
        step,
        max_distance,
        LayerMask::DEFAULT_RAYCAST_LAYERS,
        scratch,
    );
    let hit = prioritized_hit(scratch, priorities);
    scratch.clear();
    hit
}

/// Resolve `state` against the scene along `rays`.
///
/// Each segment is queried up to `min(segment.length, extent)`. On return the
/// state's previous target holds the target it had on entry.
///
/// Returns the index of the winning segment, or `None` on a miss.
pub fn cast_scene<K, P, S>(
    state: &mut PointerFocusState<K, P>,
    rays: &[RaySegment],
    priorities: &LayerPriorities,
    extent: f32,
    scene: &S,
    scratch: &mut Vec<SceneHit<K>>,
) -> Result<Option<usize>, FocusError>
where
    K: Copy,
    S: SceneRaycaster<K> + ?Sized,
{
    let Some(last) = rays.last() else {
        return Err(FocusError::MissingRays(state.id()));
    };
    for (index, step) in rays.iter().enumerate() {
        let max_distance = step.length.min(extent);
        if let Some(hit) = raycast_step(scene, step, max_distance, priorities, scratch) {
            trace!(
                pointer = state.id().get(),
                step = index,
                distance = hit.distance,
                "scene hit"
            );
            state.update_scene_hit(&hit, step, index);
            return Ok(Some(index));
        }
    }
    state.update_miss(last, rays.len() - 1);
    Ok(None)
}
