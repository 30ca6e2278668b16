// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus notifications and the dispatcher that receives them.
//!
//! Any `Vec<FocusEvent<K>>` is a dispatcher that simply records what it is
//! told, which is handy for tests and for hosts that drain events after a tick.
//!
//! ```
//! use understory_pointer_focus::dispatch::{FocusDispatcher, FocusEvent};
//! use understory_pointer_focus::PointerId;
//!
//! let pointer = PointerId::new(1).unwrap();
//! let mut events: Vec<FocusEvent<u32>> = Vec::new();
//! events.focus_enter(pointer, 7);
//! assert_eq!(events, vec![FocusEvent::Enter { pointer, target: 7 }]);
//! ```

use alloc::vec::Vec;

use crate::types::PointerId;

/// Receiver of focus notifications.
///
/// For each pointer whose target changed in a tick the provider raises, in
/// order: `pre_focus_changed`, `focus_exit` (if the old target lost all
/// pointers), `focus_enter` (if the new target had no pointer before) and
/// `focus_changed`.
pub trait FocusDispatcher<K> {
    /// A pointer is about to move from `old` to `new`.
    fn pre_focus_changed(&mut self, pointer: PointerId, old: Option<K>, new: Option<K>);
    /// No pointer targets `target` anymore.
    fn focus_exit(&mut self, pointer: PointerId, target: K);
    /// `target` is now targeted by a pointer and was not before.
    fn focus_enter(&mut self, pointer: PointerId, target: K);
    /// A pointer moved from `old` to `new`.
    fn focus_changed(&mut self, pointer: PointerId, old: Option<K>, new: Option<K>);
}

/// A recorded focus notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusEvent<K> {
    /// See [`FocusDispatcher::pre_focus_changed`].
    PreFocusChanged {
        /// The pointer whose target changes.
        pointer: PointerId,
        /// Previous target.
        old: Option<K>,
        /// New target.
        new: Option<K>,
    },
    /// See [`FocusDispatcher::focus_exit`].
    Exit {
        /// The pointer that left last.
        pointer: PointerId,
        /// The object that lost focus.
        target: K,
    },
    /// See [`FocusDispatcher::focus_enter`].
    Enter {
        /// The pointer that arrived first.
        pointer: PointerId,
        /// The object that gained focus.
        target: K,
    },
    /// See [`FocusDispatcher::focus_changed`].
    Changed {
        /// The pointer whose target changed.
        pointer: PointerId,
        /// Previous target.
        old: Option<K>,
        /// New target.
        new: Option<K>,
    },
}

impl<K> FocusDispatcher<K> for Vec<FocusEvent<K>> {
    fn pre_focus_changed(&mut self, pointer: PointerId, old: Option<K>, new: Option<K>) {
        self.push(FocusEvent::PreFocusChanged { pointer, old, new });
    }

    fn focus_exit(&mut self, pointer: PointerId, target: K) {
        self.push(FocusEvent::Exit { pointer, target });
    }

    fn focus_enter(&mut self, pointer: PointerId, target: K) {
        self.push(FocusEvent::Enter { pointer, target });
    }

    fn focus_changed(&mut self, pointer: PointerId, old: Option<K>, new: Option<K>) {
        self.push(FocusEvent::Changed { pointer, old, new });
    }
}

impl<K, D: FocusDispatcher<K> + ?Sized> FocusDispatcher<K> for &mut D {
    fn pre_focus_changed(&mut self, pointer: PointerId, old: Option<K>, new: Option<K>) {
        (**self).pre_focus_changed(pointer, old, new);
    }

    fn focus_exit(&mut self, pointer: PointerId, target: K) {
        (**self).focus_exit(pointer, target);
    }

    fn focus_enter(&mut self, pointer: PointerId, target: K) {
        (**self).focus_enter(pointer, target);
    }

    fn focus_changed(&mut self, pointer: PointerId, old: Option<K>, new: Option<K>) {
        (**self).focus_changed(pointer, old, new);
    }
}
