// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus event diffing across all pointers of a tick.
//!
//! ## Algorithm
//!
//! 1. Every pointer whose target changed is recorded as a pending change. Its
//!    old target is tentatively exited and its new target tentatively entered.
//! 2. For every pointer, changed or not, its current target is removed from
//!    the exit set (someone still focuses it) and its previous target is
//!    removed from the enter set (someone already focused it).
//! 3. Changes are emitted in recorded order: pre-focus-changed, exit if the
//!    old target is still pending exit, enter if the new target is still
//!    pending enter, then focus-changed. Each exit or enter is raised at most
//!    once per object.
//!
//! Both pending sets are empty before and after every run.
//!
//! ## Minimal example
//!
//! Two pointers move onto the same object in one tick; it is entered once.
//!
//! ```
//! use understory_pointer_focus::PointerId;
//! use understory_pointer_focus::diff::{FocusDiff, FocusTransition};
//! use understory_pointer_focus::dispatch::FocusEvent;
//!
//! let a = PointerId::new(1).unwrap();
//! let b = PointerId::new(2).unwrap();
//! let mut diff = FocusDiff::new();
//! let mut events: Vec<FocusEvent<u32>> = Vec::new();
//! diff.run(
//!     &[
//!         FocusTransition { pointer: a, previous: None, current: Some(7) },
//!         FocusTransition { pointer: b, previous: None, current: Some(7) },
//!     ],
//!     &mut events,
//! );
//! let enters = events
//!     .iter()
//!     .filter(|e| matches!(e, FocusEvent::Enter { .. }))
//!     .count();
//! assert_eq!(enters, 1);
//! ```

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;
use tracing::trace;

use crate::dispatch::FocusDispatcher;
use crate::types::PointerId;

/// Previous and current target of one pointer for a tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusTransition<K> {
    /// The pointer.
    pub pointer: PointerId,
    /// Target before the tick.
    pub previous: Option<K>,
    /// Target after the tick.
    pub current: Option<K>,
}

impl<K: PartialEq> FocusTransition<K> {
    /// Whether the pointer's target changed.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.previous != self.current
    }
}

/// Reusable scratch for computing focus events.
///
/// Keep one per provider; the buffers retain capacity across ticks.
#[derive(Debug)]
pub struct FocusDiff<K> {
    exits: HashSet<K>,
    enters: HashSet<K>,
    changes: Vec<FocusTransition<K>>,
}

impl<K> Default for FocusDiff<K> {
    fn default() -> Self {
        Self {
            exits: HashSet::new(),
            enters: HashSet::new(),
            changes: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> FocusDiff<K> {
    /// Create empty scratch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and raise the focus events for one tick.
    ///
    /// `transitions` must cover every registered pointer, not only the ones
    /// that changed. Returns the number of pointers whose target changed.
    pub fn run<D>(&mut self, transitions: &[FocusTransition<K>], dispatcher: &mut D) -> usize
    where
        D: FocusDispatcher<K> + ?Sized,
    {
        debug_assert!(
            self.exits.is_empty() && self.enters.is_empty() && self.changes.is_empty(),
            "pending focus sets must be empty between ticks"
        );
        self.reset();

        for t in transitions.iter().filter(|t| t.is_change()) {
            self.changes.push(*t);
            if let Some(previous) = t.previous {
                self.exits.insert(previous);
            }
            if let Some(current) = t.current {
                self.enters.insert(current);
            }
        }

        if self.changes.is_empty() {
            return 0;
        }

        for t in transitions {
            if let Some(current) = t.current {
                self.exits.remove(&current);
            }
            if let Some(previous) = t.previous {
                self.enters.remove(&previous);
            }
        }

        for change in &self.changes {
            let FocusTransition {
                pointer,
                previous,
                current,
            } = *change;
            dispatcher.pre_focus_changed(pointer, previous, current);
            if let Some(previous) = previous {
                if self.exits.remove(&previous) {
                    dispatcher.focus_exit(pointer, previous);
                }
            }
            if let Some(current) = current {
                if self.enters.remove(&current) {
                    dispatcher.focus_enter(pointer, current);
                }
            }
            dispatcher.focus_changed(pointer, previous, current);
        }

        debug_assert!(
            self.exits.is_empty() && self.enters.is_empty(),
            "every pending exit and enter must be raised"
        );
        let changed = self.changes.len();
        trace!(changed, "focus changes raised");
        self.reset();
        changed
    }

    fn reset(&mut self) {
        self.exits.clear();
        self.enters.clear();
        self.changes.clear();
    }
}
