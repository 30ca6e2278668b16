// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The focus provider: registry, per-tick resolution and event diffing.
//!
//! ## Usage
//!
//! - Construct with [`FocusProvider::new`], injecting the dispatcher that
//!   receives focus notifications.
//! - Register pointers as their input sources appear
//!   ([`FocusProvider::register_pointer`] or
//!   [`FocusProvider::on_source_detected`]) and unregister them when the
//!   sources are lost.
//! - Call [`FocusProvider::update`] (or
//!   [`FocusProvider::update_with_overlay`]) once per frame. Pointers may
//!   refresh their rays beforehand or in [`Pointer::on_pre_raycast`].
//!
//! A tick resolves every pointer first and only then diffs, so events always
//! see a consistent snapshot of all pointers.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::hash::Hash;

use tracing::debug;

use crate::config::FocusConfig;
use crate::diff::{FocusDiff, FocusTransition};
use crate::dispatch::FocusDispatcher;
use crate::error::FocusError;
use crate::overlay::{NoOverlay, OverlayRaycaster};
use crate::pointer::Pointer;
use crate::registry::{IdGenerator, PointerRegistry};
use crate::scene::SceneRaycaster;
use crate::state::PointerFocusState;
use crate::types::{FocusDetails, PointerId};
use crate::updater::{
    RaycastScratch, check_rays, resolve_pointer, run_post_raycast, run_pre_raycast,
};

/// Resolves focus for every registered pointer and raises focus events.
pub struct FocusProvider<K, P, D> {
    config: FocusConfig,
    registry: PointerRegistry<K, P>,
    diff: FocusDiff<K>,
    scratch: RaycastScratch<K>,
    transitions: Vec<FocusTransition<K>>,
    ids: IdGenerator,
    dispatcher: D,
}

impl<K: core::fmt::Debug, P, D> core::fmt::Debug for FocusProvider<K, P, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FocusProvider")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<K, P, D> FocusProvider<K, P, D>
where
    K: Copy + Eq + Hash,
    P: Pointer<K>,
    D: FocusDispatcher<K>,
{
    /// Create a provider with no pointers.
    pub fn new(config: FocusConfig, dispatcher: D) -> Self {
        Self {
            scratch: RaycastScratch::new(&config),
            config,
            registry: PointerRegistry::new(),
            diff: FocusDiff::new(),
            transitions: Vec::new(),
            ids: IdGenerator::default(),
            dispatcher,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next tick.
    pub fn set_config(&mut self, config: FocusConfig) {
        self.scratch.viewpoint.set_config(config.overlay_viewpoint);
        self.config = config;
    }

    /// The injected dispatcher.
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// The injected dispatcher, mutably (for example to drain recorded events).
    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Consume the provider, returning the dispatcher.
    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }

    /// Registered pointers and their focus state.
    pub fn registry(&self) -> &PointerRegistry<K, P> {
        &self.registry
    }

    /// Register a pointer; `false` if its id is `0` or already registered.
    pub fn register_pointer(&mut self, pointer: &Rc<RefCell<P>>) -> bool {
        self.registry.register(pointer)
    }

    /// Register a pointer, reporting why registration failed.
    pub fn try_register_pointer(
        &mut self,
        pointer: &Rc<RefCell<P>>,
    ) -> Result<PointerId, FocusError> {
        self.registry.try_register(pointer)
    }

    /// Unregister a pointer; `false` if it was not registered.
    ///
    /// Raises an exit for its target if no other pointer focuses it, then a
    /// pre-focus-change to `None`.
    pub fn unregister_pointer(&mut self, id: PointerId) -> bool {
        self.registry.unregister(id, &mut self.dispatcher)
    }

    /// Whether `id` is registered.
    pub fn is_pointer_registered(&self, id: PointerId) -> bool {
        self.registry.is_registered(id)
    }

    /// A fresh id not held by any registered pointer.
    pub fn generate_pointer_id(&mut self) -> PointerId {
        let ids = &mut self.ids;
        self.registry.generate_unique_id(|| ids.next_raw())
    }

    /// Register every pointer of a newly detected input source.
    ///
    /// Returns how many were registered.
    pub fn on_source_detected<'a>(
        &mut self,
        pointers: impl IntoIterator<Item = &'a Rc<RefCell<P>>>,
    ) -> usize
    where
        P: 'a,
    {
        pointers
            .into_iter()
            .filter(|pointer| self.registry.register(pointer))
            .count()
    }

    /// Unregister every pointer of a lost input source.
    ///
    /// Returns how many were unregistered.
    pub fn on_source_lost(&mut self, ids: impl IntoIterator<Item = PointerId>) -> usize {
        ids.into_iter()
            .filter(|&id| self.registry.unregister(id, &mut self.dispatcher))
            .count()
    }

    /// Focus state of `id`, if registered.
    pub fn pointer_state(&self, id: PointerId) -> Option<&PointerFocusState<K, P>> {
        self.registry.find(id)
    }

    /// The object `id` focuses, if registered and focusing anything.
    pub fn focused_object(&self, id: PointerId) -> Option<K> {
        self.registry.find(id)?.current_target()
    }

    /// Target, end point and normal of `id`, if registered.
    pub fn focus_details(&self, id: PointerId) -> Option<FocusDetails<K>> {
        self.registry.find(id).map(PointerFocusState::details)
    }

    /// Whether any pointer focuses `target`.
    pub fn is_focused(&self, target: K) -> bool {
        self.registry.is_targeted(target)
    }

    /// Run one tick against the scene only.
    pub fn update<S>(&mut self, scene: &S) -> Result<(), FocusError>
    where
        S: SceneRaycaster<K> + ?Sized,
    {
        self.update_with_overlay(scene, None::<&NoOverlay>)
    }

    /// Run one tick against the scene and, if given, the overlay.
    ///
    /// Every pointer's pre-raycast hook runs first. Then every live pointer
    /// must offer at least one ray segment; otherwise the post-raycast hooks
    /// run and [`FocusError::MissingRays`] is returned with no focus state
    /// changed. Otherwise every pointer is resolved, its post-raycast hook
    /// runs, and focus events are raised.
    pub fn update_with_overlay<S, O>(
        &mut self,
        scene: &S,
        overlay: Option<&O>,
    ) -> Result<(), FocusError>
    where
        S: SceneRaycaster<K> + ?Sized,
        O: OverlayRaycaster<K> + ?Sized,
    {
        self.registry.iter().for_each(run_pre_raycast);

        if let Err(err) = self.registry.iter().try_for_each(check_rays) {
            self.registry.iter().for_each(run_post_raycast);
            return Err(err);
        }

        let mut outcome = Ok(());
        for state in self.registry.iter_mut() {
            let resolved = resolve_pointer(state, &self.config, scene, overlay, &mut self.scratch);
            outcome = outcome.and(resolved);
        }
        self.registry.iter().for_each(run_post_raycast);

        self.transitions.clear();
        self.transitions
            .extend(self.registry.iter().map(|state| FocusTransition {
                pointer: state.id(),
                previous: state.previous_target(),
                current: state.current_target(),
            }));
        let changed = self.diff.run(&self.transitions, &mut self.dispatcher);
        self.transitions.clear();
        if changed > 0 {
            debug!(changed, pointers = self.registry.len(), "focus updated");
        }
        outcome
    }
}
