// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer update for one tick.
//!
//! Each pointer is taken through:
//!
//! 1. [`Pointer::on_pre_raycast`], which may rebuild the pointer's rays.
//! 2. One of:
//!    - interaction disabled: the current target is cleared so that the object
//!      it left still gets an exit;
//!    - focus locked: the current target is kept without raycasting;
//!    - otherwise: the scene pass, then the overlay pass when an overlay is
//!      present, then [`Pointer::set_result`].
//! 3. [`Pointer::on_post_raycast`].
//!
//! [`update_pointer`] runs all three steps for one pointer. A provider
//! updating many pointers runs the steps as separate passes
//! ([`run_pre_raycast`], [`resolve_pointer`], [`run_post_raycast`]) so that
//! rays can be checked for every pointer before any state changes.

use alloc::vec::Vec;

use tracing::{debug, trace, warn};

use crate::config::FocusConfig;
use crate::error::FocusError;
use crate::overlay::{OverlayRaycaster, OverlayViewpoint, cast_overlay};
use crate::pointer::Pointer;
use crate::scene::{SceneRaycaster, cast_scene};
use crate::state::PointerFocusState;
use crate::types::SceneHit;

/// Scratch resources reused across pointers and ticks.
#[derive(Debug)]
pub struct RaycastScratch<K> {
    /// The viewpoint moved onto each segment for overlay queries.
    pub viewpoint: OverlayViewpoint,
    pub(crate) hits: Vec<SceneHit<K>>,
}

impl<K> RaycastScratch<K> {
    /// Create scratch with a viewpoint built from `config`.
    #[must_use]
    pub fn new(config: &FocusConfig) -> Self {
        Self {
            viewpoint: OverlayViewpoint::new(config.overlay_viewpoint),
            hits: Vec::new(),
        }
    }
}

/// Run the pre-raycast hook of the pointer behind `state`, if it is alive.
pub fn run_pre_raycast<K: Copy, P: Pointer<K>>(state: &PointerFocusState<K, P>) {
    if let Some(pointer) = state.pointer() {
        pointer.borrow_mut().on_pre_raycast();
    }
}

/// Run the post-raycast hook of the pointer behind `state`, if it is alive.
pub fn run_post_raycast<K: Copy, P: Pointer<K>>(state: &PointerFocusState<K, P>) {
    if let Some(pointer) = state.pointer() {
        pointer.borrow_mut().on_post_raycast();
    }
}

/// Check that the pointer behind `state` offers at least one ray segment.
///
/// A pointer the host has already dropped passes.
pub fn check_rays<K: Copy, P: Pointer<K>>(
    state: &PointerFocusState<K, P>,
) -> Result<(), FocusError> {
    match state.pointer() {
        Some(pointer) if pointer.borrow().rays().is_empty() => {
            Err(FocusError::MissingRays(state.id()))
        }
        _ => Ok(()),
    }
}

/// Resolve one pointer for the current tick, hooks included.
///
/// Returns [`FocusError::MissingRays`] if the pointer needs a raycast but
/// offers no ray segments. A pointer the host has already dropped is treated
/// as disabled.
pub fn update_pointer<K, P, S, O>(
    state: &mut PointerFocusState<K, P>,
    config: &FocusConfig,
    scene: &S,
    overlay: Option<&O>,
    scratch: &mut RaycastScratch<K>,
) -> Result<(), FocusError>
where
    K: Copy,
    P: Pointer<K>,
    S: SceneRaycaster<K> + ?Sized,
    O: OverlayRaycaster<K> + ?Sized,
{
    run_pre_raycast(state);
    let outcome = resolve_pointer(state, config, scene, overlay, scratch);
    run_post_raycast(state);
    outcome
}

/// Resolve one pointer without running its hooks.
///
/// On success of the cast branch the result is published through
/// [`Pointer::set_result`]. On error the state is left untouched.
pub fn resolve_pointer<K, P, S, O>(
    state: &mut PointerFocusState<K, P>,
    config: &FocusConfig,
    scene: &S,
    overlay: Option<&O>,
    scratch: &mut RaycastScratch<K>,
) -> Result<(), FocusError>
where
    K: Copy,
    P: Pointer<K>,
    S: SceneRaycaster<K> + ?Sized,
    O: OverlayRaycaster<K> + ?Sized,
{
    let Some(pointer) = state.pointer() else {
        warn!(
            pointer = state.id().get(),
            "pointer dropped without unregistering"
        );
        state.clear_target();
        return Ok(());
    };

    let cast = {
        let p = pointer.borrow();
        if !p.is_interaction_enabled() {
            state.clear_target();
            false
        } else if p.is_focus_locked() {
            state.hold_target();
            false
        } else {
            let rays = p.rays();
            let priorities = p.priority_override().unwrap_or(&config.priorities);
            let extent = p.extent_override().unwrap_or(config.max_ray_length);
            if config.debug_rays {
                for (index, ray) in rays.iter().enumerate() {
                    debug!(
                        pointer = state.id().get(),
                        step = index,
                        origin = ?ray.origin,
                        direction = ?ray.direction,
                        length = ray.length,
                        "pointer ray"
                    );
                }
            }
            cast_scene(state, rays, priorities, extent, scene, &mut scratch.hits)?;
            if let Some(overlay) = overlay {
                cast_overlay(state, rays, priorities, overlay, &mut scratch.viewpoint);
            }
            true
        }
    };

    if cast {
        trace!(pointer = state.id().get(), "publishing focus result");
        pointer.borrow_mut().set_result(&state.result());
    }
    Ok(())
}
