// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Pointer Focus: per-pointer 3D focus resolution with minimal enter/exit events.
//!
//! ## Overview
//!
//! Every registered pointer (a hand ray, a gaze, a controller, a mouse
//! projected into the world) offers an ordered list of ray segments each tick.
//! The [`FocusProvider`] casts those segments into your 3D scene, optionally
//! checks a 2D overlay on top of it, and remembers what each pointer focuses.
//! After all pointers are resolved it compares every pointer's previous and
//! current target and raises the smallest set of focus events:
//!
//! - an object is *entered* once when the first pointer reaches it, even if
//!   several pointers arrive in the same tick;
//! - an object is *exited* once when the last pointer leaves it;
//! - every pointer whose target changed gets a pre-change and a changed
//!   notification.
//!
//! The crate performs no geometry itself. You provide it through two traits:
//!
//! - [`SceneRaycaster`](scene::SceneRaycaster) answers nearest-hit and
//!   all-hits queries against the scene, filtered by [`LayerMask`].
//! - [`OverlayRaycaster`](overlay::OverlayRaycaster) answers screen-space
//!   queries against the overlay from an
//!   [`OverlayViewpoint`](overlay::OverlayViewpoint) the provider moves along
//!   each pointer's ray.
//!
//! Notifications go to a [`FocusDispatcher`](dispatch::FocusDispatcher)
//! injected at construction. `Vec<FocusEvent<K>>` implements it, which is
//! handy for tests and for hosts that drain events after each tick.
//!
//! ## Layer priorities
//!
//! A [`LayerPriorities`] list decides which hit wins along one segment. With a
//! single entry the nearest hit on that mask wins. With several entries all
//! hits are gathered and the hit on the earliest matching entry wins, ties
//! going to the nearer hit. The same list arbitrates between a 3D hit and an
//! overlay hit.
//!
//! ## Pointers
//!
//! Pointers implement [`Pointer`] and are shared as `Rc<RefCell<P>>`. The
//! registry keeps only weak references: a pointer the host drops without
//! unregistering loses its focus on the next tick.
//!
//! A pointer can be disabled (its target is cleared, so the object receives
//! an exit) or focus-locked (its target is kept without raycasting). It may
//! override the provider's priorities and maximum ray length.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use glam::Vec3;
//! use understory_pointer_focus::dispatch::FocusEvent;
//! use understory_pointer_focus::scene::SceneRaycaster;
//! use understory_pointer_focus::types::{FocusResult, SceneHit};
//! use understory_pointer_focus::{
//!     FocusConfig, FocusProvider, Layer, LayerMask, Pointer, PointerId, RaySegment,
//! };
//!
//! struct Hand {
//!     rays: Vec<RaySegment>,
//! }
//!
//! impl Pointer<u32> for Hand {
//!     fn pointer_id(&self) -> u64 {
//!         1
//!     }
//!     fn rays(&self) -> &[RaySegment] {
//!         &self.rays
//!     }
//!     fn set_result(&mut self, _result: &FocusResult<u32>) {}
//! }
//!
//! /// A single wall at z = 2 covering everything.
//! struct Wall;
//!
//! impl SceneRaycaster<u32> for Wall {
//!     fn raycast(&self, ray: &RaySegment, max: f32, layers: LayerMask) -> Option<SceneHit<u32>> {
//!         let distance = (2.0 - ray.origin.z) / ray.direction.z;
//!         (layers.contains_layer(Layer::DEFAULT) && distance >= 0.0 && distance <= max).then(|| {
//!             SceneHit {
//!                 target: 42,
//!                 layer: Layer::DEFAULT,
//!                 point: ray.at(distance),
//!                 normal: Vec3::NEG_Z,
//!                 distance,
//!             }
//!         })
//!     }
//!     fn raycast_all(
//!         &self,
//!         ray: &RaySegment,
//!         max: f32,
//!         layers: LayerMask,
//!         out: &mut Vec<SceneHit<u32>>,
//!     ) {
//!         out.extend(self.raycast(ray, max, layers));
//!     }
//! }
//!
//! let hand = Rc::new(RefCell::new(Hand {
//!     rays: vec![RaySegment::new(Vec3::ZERO, Vec3::Z, 10.0)],
//! }));
//! let mut provider = FocusProvider::new(FocusConfig::default(), Vec::<FocusEvent<u32>>::new());
//! assert!(provider.register_pointer(&hand));
//!
//! provider.update(&Wall).unwrap();
//! let id = PointerId::new(1).unwrap();
//! assert_eq!(provider.focused_object(id), Some(42));
//! assert!(provider.dispatcher().contains(&FocusEvent::Enter { pointer: id, target: 42 }));
//! ```
//!
//! ## Features
//!
//! - `std` (default): use the standard library for float math.
//! - `libm`: use `libm` for float math in `no_std` builds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod overlay;
pub mod pointer;
pub mod provider;
pub mod registry;
pub mod scene;
pub mod state;
pub mod types;
pub mod updater;

#[cfg(test)]
mod test_util;

pub use config::FocusConfig;
pub use error::FocusError;
pub use pointer::Pointer;
pub use provider::FocusProvider;
pub use types::{
    FocusDetails, FocusResult, Layer, LayerMask, LayerPriorities, PointerId, RaySegment,
};
