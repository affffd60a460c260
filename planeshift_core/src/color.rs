// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Solid fill colors.

/// An 8-bit-per-channel, non-premultiplied RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 0 is fully transparent, 255 fully opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    ///
    /// Used as the "no color" sentinel when a layer cannot take the
    /// solid-color overlay path.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a color from its four channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the alpha channel is at least `min`.
    ///
    /// With `min == u8::MAX` this is a full opacity test.
    #[inline]
    #[must_use]
    pub const fn is_opaque_at(self, min: u8) -> bool {
        self.a >= min
    }

    /// Whether the alpha channel is zero.
    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}
