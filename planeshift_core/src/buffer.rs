// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffer descriptors and content placement.
//!
//! A [`BufferDescriptor`] describes the most recently produced buffer of a
//! surface as reported by the producer side. [`ContentFit`] describes how that
//! buffer is placed inside the surface's bounds.

/// Clockwise rotation applied to a buffer's contents by its producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BufferRotation {
    /// No rotation.
    #[default]
    None,
    /// 90° clockwise.
    Rotate90,
    /// 180°.
    Rotate180,
    /// 270° clockwise.
    Rotate270,
}

impl BufferRotation {
    /// Whether this rotation swaps the buffer's horizontal and vertical axes.
    #[inline]
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }

    /// Rotation in degrees.
    #[inline]
    #[must_use]
    pub const fn degrees(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }
}

/// Pixel layout of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit RGBA.
    #[default]
    Rgba8888,
    /// 8-bit RGB with an ignored alpha byte.
    Rgbx8888,
    /// 10-bit RGB, 2-bit alpha.
    Rgba1010102,
    /// Semi-planar 4:2:0 YUV, 8-bit.
    Nv12,
    /// Semi-planar 4:2:0 YUV, 10-bit.
    P010,
}

/// How a buffer is placed inside the bounds of its surface.
///
/// All modes except [`Resize`](Self::Resize) keep the buffer's aspect ratio
/// or its native size, which can leave part of the bounds uncovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ContentFit {
    /// Stretch the buffer to exactly fill the bounds.
    #[default]
    Resize,
    /// Native size, anchored at the top-left corner.
    TopLeft,
    /// Native size, centered.
    Center,
    /// Scale uniformly until the buffer fits inside the bounds.
    Contain,
    /// Scale uniformly until the buffer covers the bounds.
    Cover,
}

/// The producer-side description of a surface's current buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    /// Width in pixels, before rotation.
    pub width: u32,
    /// Height in pixels, before rotation.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Producer-applied rotation.
    pub rotation: BufferRotation,
}

impl BufferDescriptor {
    /// Creates an unrotated RGBA descriptor.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8888,
            rotation: BufferRotation::None,
        }
    }

    /// Returns the same descriptor with a different rotation.
    #[inline]
    #[must_use]
    pub const fn with_rotation(self, rotation: BufferRotation) -> Self {
        Self { rotation, ..self }
    }

    /// Width and height as seen after rotation is applied.
    #[inline]
    #[must_use]
    pub const fn oriented_size(self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Whether either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}
