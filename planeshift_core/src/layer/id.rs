// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles for layers and producer surfaces.

use core::fmt;

/// Marks an absent slot in link and index columns.
pub const INVALID: u32 = u32::MAX;

/// Generational handle to a layer in a [`LayerStore`](super::LayerStore).
///
/// Destroying a layer bumps its slot's generation, so every handle taken
/// before that stops validating, even after the slot is recycled.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl LayerId {
    /// Slot index. Only meaningful together with [`generation`](Self::generation).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}v{})", self.idx, self.generation)
    }
}

/// A buffer producer, as named by the buffer subsystem.
///
/// Color-sampling regions are keyed by the surface being sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);
