// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display output identification and geometry.
//!
//! [`OutputId`] is a lightweight handle identifying a specific display. Output
//! 0 is the primary display. [`ScreenInfo`] carries the per-display facts the
//! offload decision depends on.

use core::fmt;

use crate::rect::PixelRect;

/// Identifies a specific display output.
///
/// Output 0 is the primary (built-in) display. Other values are assigned by
/// the display manager and are otherwise opaque.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OutputId(pub u32);

impl OutputId {
    /// The primary display.
    pub const PRIMARY: Self = Self(0);

    /// Whether this is the primary display.
    #[inline]
    #[must_use]
    pub const fn is_primary(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.0)
    }
}

/// How a display's content is produced relative to other displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CompositeType {
    /// The display shows its own independently composed scene.
    #[default]
    Unified,
    /// The display mirrors another display's output.
    Mirror,
    /// The display extends the desktop of the primary display.
    Expand,
}

/// Geometry and mode of one display for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Which display.
    pub id: OutputId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Position of this display's top-left corner in the global (multi-display)
    /// coordinate space.
    pub offset: (i32, i32),
    /// How the display is composed.
    pub composite: CompositeType,
}

impl ScreenInfo {
    /// Creates a unified display at the global origin.
    #[must_use]
    pub const fn new(id: OutputId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            offset: (0, 0),
            composite: CompositeType::Unified,
        }
    }

    /// The display's rect in its own coordinate space.
    #[must_use]
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(
            0,
            0,
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}
