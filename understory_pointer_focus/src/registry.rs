// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of active pointers and their focus state.
//!
//! States are kept in registration order, which is also the order in which
//! pointers are updated and their focus changes are reported.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use tracing::{debug, warn};

use crate::dispatch::FocusDispatcher;
use crate::error::FocusError;
use crate::pointer::Pointer;
use crate::state::PointerFocusState;
use crate::types::PointerId;

/// The set of registered pointers.
pub struct PointerRegistry<K, P> {
    states: Vec<PointerFocusState<K, P>>,
}

impl<K: core::fmt::Debug, P> core::fmt::Debug for PointerRegistry<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.states.iter()).finish()
    }
}

impl<K, P> Default for PointerRegistry<K, P> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<K: Copy + Eq, P: Pointer<K>> PointerRegistry<K, P> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pointer`, returning its id.
    ///
    /// Fails with [`FocusError::InvalidPointerId`] for id `0` and with
    /// [`FocusError::AlreadyRegistered`] when the id is already active; the
    /// registry is unchanged in both cases.
    pub fn try_register(&mut self, pointer: &Rc<RefCell<P>>) -> Result<PointerId, FocusError> {
        let raw = pointer.borrow().pointer_id();
        let id = PointerId::new(raw).ok_or(FocusError::InvalidPointerId)?;
        if self.is_registered(id) {
            return Err(FocusError::AlreadyRegistered(id));
        }
        self.states.push(PointerFocusState::new(id, pointer));
        debug!(pointer = raw, "registered pointer");
        Ok(id)
    }

    /// Register `pointer`; `false` if its id is `0` or already registered.
    pub fn register(&mut self, pointer: &Rc<RefCell<P>>) -> bool {
        match self.try_register(pointer) {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "pointer not registered");
                false
            }
        }
    }

    /// Remove the pointer `id`; `false` if it was not registered.
    ///
    /// If the pointer was focusing an object that no other pointer focuses,
    /// `dispatcher` first receives an exit for it. A pre-focus-change to
    /// `None` is always raised.
    pub fn unregister<D>(&mut self, id: PointerId, dispatcher: &mut D) -> bool
    where
        D: FocusDispatcher<K> + ?Sized,
    {
        let Some(index) = self.states.iter().position(|s| s.id() == id) else {
            return false;
        };
        let state = self.states.remove(index);
        let target = state.current_target();
        if let Some(target) = target {
            if !self.is_targeted(target) {
                dispatcher.focus_exit(id, target);
            }
        }
        dispatcher.pre_focus_changed(id, target, None);
        debug!(pointer = id.get(), "unregistered pointer");
        true
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn is_registered(&self, id: PointerId) -> bool {
        self.states.iter().any(|s| s.id() == id)
    }

    /// Focus state of `id`, if registered.
    #[must_use]
    pub fn find(&self, id: PointerId) -> Option<&PointerFocusState<K, P>> {
        self.states.iter().find(|s| s.id() == id)
    }

    /// Mutable focus state of `id`, if registered.
    pub fn find_mut(&mut self, id: PointerId) -> Option<&mut PointerFocusState<K, P>> {
        self.states.iter_mut().find(|s| s.id() == id)
    }

    /// Whether any registered pointer currently focuses `target`.
    #[must_use]
    pub fn is_targeted(&self, target: K) -> bool {
        self.states
            .iter()
            .any(|s| s.current_target() == Some(target))
    }

    /// Produce an id that is non-zero and not held by any registered pointer.
    ///
    /// `next_raw` is drawn from until it yields a usable value.
    pub fn generate_unique_id(&self, mut next_raw: impl FnMut() -> u64) -> PointerId {
        loop {
            let raw = next_raw();
            match PointerId::new(raw) {
                Some(id) if !self.is_registered(id) => return id,
                _ => {
                    debug!(raw, "pointer id unavailable, retrying");
                }
            }
        }
    }
}

impl<K, P> PointerRegistry<K, P> {
    /// States in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PointerFocusState<K, P>> {
        self.states.iter()
    }

    /// Mutable states in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PointerFocusState<K, P>> {
        self.states.iter_mut()
    }

    /// Number of registered pointers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no pointer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Small xorshift generator for pointer ids.
///
/// Hosts with their own source of randomness can pass it directly to
/// [`PointerRegistry::generate_unique_id`] instead.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    state: u64,
}

impl IdGenerator {
    /// Create a generator; a zero seed is replaced with a fixed constant.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                0x9E37_79B9_7F4A_7C15
            } else {
                seed
            },
        }
    }

    /// Next raw value.
    pub fn next_raw(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
