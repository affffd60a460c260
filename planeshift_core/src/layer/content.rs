// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a layer draws.

use alloc::sync::Arc;
use core::fmt;

use crate::buffer::{BufferDescriptor, ContentFit};
use crate::color::Rgba8;

use super::id::SurfaceId;

/// Identifies the application that owns a surface.
///
/// Policy capabilities are granted per bundle. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bundle(Arc<str>);

impl Bundle {
    /// Creates a bundle identity from its name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// The bundle name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bundle({})", self.0)
    }
}

impl From<&str> for Bundle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Per-surface flags supplied by the scene graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceFlags {
    /// The surface presents a producer buffer itself and is an overlay
    /// candidate.
    pub self_drawing: bool,
    /// Protected (DRM) content.
    pub protected: bool,
    /// Mirrored onto more than one display.
    pub cross_node: bool,
    /// Positioned in global multi-display coordinates.
    pub global_position: bool,
    /// Placement is dictated by an external vendor composition framework.
    pub vendor_forced_direct: bool,
    /// The producer asked for the overlay path.
    pub hardware_hint: bool,
    /// Upstream policy, freeze, or suspension forbids the overlay path.
    pub force_disabled: bool,
    /// Streamed or video content.
    pub stream_content: bool,
    /// High dynamic range content.
    pub hdr: bool,
    /// Content requires AI upscale preprocessing on the GPU.
    pub needs_upscale: bool,
}

/// A buffer-backed surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceContent {
    /// Producer-side surface identity.
    pub surface: SurfaceId,
    /// Owning application.
    pub bundle: Bundle,
    /// Current buffer, if one has been produced.
    pub buffer: Option<BufferDescriptor>,
    /// Background fill, used when there is no buffer.
    pub background: Option<Rgba8>,
    /// Buffer placement inside the bounds.
    pub fit: ContentFit,
    /// API level of the owning application.
    pub api_version: u32,
    /// Flags.
    pub flags: SurfaceFlags,
}

impl SurfaceContent {
    /// Creates a self-drawing surface with no buffer yet.
    #[must_use]
    pub fn new(surface: SurfaceId, bundle: Bundle) -> Self {
        Self {
            surface,
            bundle,
            buffer: None,
            background: None,
            fit: ContentFit::Resize,
            api_version: u32::MAX,
            flags: SurfaceFlags {
                self_drawing: true,
                ..SurfaceFlags::default()
            },
        }
    }

    /// Returns the surface with `buffer` attached.
    #[must_use]
    pub fn with_buffer(mut self, buffer: BufferDescriptor) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Returns the surface with a different content fit.
    #[must_use]
    pub fn with_fit(mut self, fit: ContentFit) -> Self {
        self.fit = fit;
        self
    }
}

/// What a layer contributes to the frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LayerContent {
    /// A pure container that paints nothing itself.
    #[default]
    Group,
    /// GPU-drawn content.
    Canvas {
        /// Background fill of the layer's bounds.
        background: Rgba8,
        /// Whether anything besides the background is drawn.
        draws_content: bool,
    },
    /// A surface that can present a buffer.
    Surface(SurfaceContent),
}

impl LayerContent {
    /// Returns the surface content, if any.
    #[inline]
    #[must_use]
    pub fn as_surface(&self) -> Option<&SurfaceContent> {
        match self {
            Self::Surface(s) => Some(s),
            _ => None,
        }
    }
}
