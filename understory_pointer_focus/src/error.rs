// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract-violation errors.
//!
//! Lookups that simply find nothing (an unregistered pointer, a pointer with
//! no focused object) are not errors; they return `Option` or `bool`.

use core::fmt;

use crate::types::PointerId;

/// A broken precondition of the focus provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusError {
    /// A pointer reported the reserved identifier `0`.
    InvalidPointerId,
    /// A pointer with this identifier is already registered.
    AlreadyRegistered(PointerId),
    /// A pointer offered no ray segments when it was about to be updated.
    MissingRays(PointerId),
    /// A priority list was built with no entries.
    EmptyPriorities,
}

impl fmt::Display for FocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPointerId => f.write_str("pointer id 0 is reserved"),
            Self::AlreadyRegistered(id) => {
                write!(f, "pointer {} is already registered", id.get())
            }
            Self::MissingRays(id) => write!(f, "pointer {} has no ray segments", id.get()),
            Self::EmptyPriorities => f.write_str("layer priority list must not be empty"),
        }
    }
}

impl core::error::Error for FocusError {}
