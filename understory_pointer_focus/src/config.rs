// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Provider configuration.

use crate::overlay::ViewpointConfig;
use crate::types::LayerPriorities;

/// Settings shared by every pointer of a [`FocusProvider`](crate::FocusProvider).
#[derive(Clone, Debug, PartialEq)]
pub struct FocusConfig {
    /// Priority list used by pointers without their own override.
    pub priorities: LayerPriorities,
    /// Maximum query distance per ray segment, unless a pointer overrides it.
    pub max_ray_length: f32,
    /// Log every resolved ray at `debug` level.
    pub debug_rays: bool,
    /// Projection of the overlay viewpoint.
    pub overlay_viewpoint: ViewpointConfig,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            priorities: LayerPriorities::default(),
            max_ray_length: 10.0,
            debug_rays: false,
            overlay_viewpoint: ViewpointConfig::default(),
        }
    }
}

impl FocusConfig {
    /// Replace the priority list.
    #[must_use]
    pub fn with_priorities(mut self, priorities: LayerPriorities) -> Self {
        self.priorities = priorities;
        self
    }

    /// Replace the maximum ray length.
    #[must_use]
    pub fn with_max_ray_length(mut self, max_ray_length: f32) -> Self {
        self.max_ray_length = max_ray_length;
        self
    }
}
