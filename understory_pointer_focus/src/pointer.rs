// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability contract a pointer must satisfy.

use crate::types::{FocusResult, LayerPriorities, RaySegment};

/// An input source that casts one or more ray segments per tick.
///
/// Pointers are owned by the host (typically in an `Rc<RefCell<_>>`); the
/// focus provider only keeps a weak reference to each registered pointer.
///
/// Only [`pointer_id`](Pointer::pointer_id), [`rays`](Pointer::rays) and
/// [`set_result`](Pointer::set_result) are required; the flags and hooks
/// default to an always-enabled, never-locked pointer.
pub trait Pointer<K> {
    /// Raw identity of the pointer. `0` is reserved and cannot be registered.
    fn pointer_id(&self) -> u64;

    /// The pointer's logical ray, broken into ordered segments.
    ///
    /// Must contain at least one segment whenever the pointer is updated.
    fn rays(&self) -> &[RaySegment];

    /// Whether the pointer currently takes part in focus resolution.
    fn is_interaction_enabled(&self) -> bool {
        true
    }

    /// Whether the pointer keeps its current target without raycasting.
    fn is_focus_locked(&self) -> bool {
        false
    }

    /// Pointer-specific priority list replacing the provider's list.
    fn priority_override(&self) -> Option<&LayerPriorities> {
        None
    }

    /// Pointer-specific maximum ray length replacing the provider's.
    fn extent_override(&self) -> Option<f32> {
        None
    }

    /// Called before the pointer is resolved each tick.
    fn on_pre_raycast(&mut self) {}

    /// Called after the pointer is resolved each tick.
    fn on_post_raycast(&mut self) {}

    /// Receives the pointer's resolved target and end point.
    fn set_result(&mut self, result: &FocusResult<K>);
}
