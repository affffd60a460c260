// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame inputs that do not live in the layer store.

use planeshift_core::layer::LayerId;
use planeshift_core::output::ScreenInfo;
use planeshift_core::rect::PixelRect;

/// A filter effect (blur and similar) rendered by some node this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterRegion {
    /// The node that owns the filter.
    pub owner: LayerId,
    /// Screen-space footprint.
    pub footprint: PixelRect,
    /// Whether the filter's cached result is still valid.
    pub clean: bool,
}

/// Everything the engine needs for one frame on one display, besides the
/// store and the shared snapshots.
#[derive(Clone, Debug)]
pub struct FrameInput {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Target display.
    pub screen: ScreenInfo,
    /// Filter regions rendered this frame.
    pub filters: Vec<FilterRegion>,
}

impl FrameInput {
    /// A frame with no filters.
    #[must_use]
    pub fn new(frame_index: u64, screen: ScreenInfo) -> Self {
        Self {
            frame_index,
            screen,
            filters: Vec::new(),
        }
    }

    /// Returns the frame with `filter` added.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterRegion) -> Self {
        self.filters.push(filter);
        self
    }
}
