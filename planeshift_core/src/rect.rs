// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel rectangles.
//!
//! Overlay planes are programmed in whole pixels, so every rectangle the
//! engine hands downstream is a [`PixelRect`]. Conversions from
//! [`kurbo::Rect`] always round *outward* so a converted rect never loses
//! coverage.

use core::fmt;

/// An axis-aligned rectangle in integer pixel coordinates.
///
/// Stored as origin plus size. A rect with a non-positive width or height is
/// [empty](Self::is_empty); all empty rects compare unequal to non-empty ones
/// but may differ from each other in origin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl PixelRect {
    /// The canonical empty rect at the origin.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a rect from origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rect from its left, top, right, and bottom edges.
    ///
    /// Extents that do not fit in `i32` saturate.
    #[inline]
    #[must_use]
    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    /// Left edge.
    #[inline]
    #[must_use]
    pub const fn left(self) -> i32 {
        self.x
    }

    /// Top edge.
    #[inline]
    #[must_use]
    pub const fn top(self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the rect covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns the overlap of two rects, or [`EMPTY`](Self::EMPTY) if they
    /// do not overlap.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            Self::EMPTY
        } else {
            Self::from_ltrb(left, top, right, bottom)
        }
    }

    /// Whether the two rects share at least one pixel.
    #[inline]
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Whether `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained by everything.
    #[must_use]
    pub fn contains_rect(self, other: Self) -> bool {
        other.is_empty()
            || (other.left() >= self.left()
                && other.top() >= self.top()
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Returns this rect moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Converts a floating-point rect to pixels, rounding outward.
    ///
    /// Non-finite input produces [`EMPTY`](Self::EMPTY). Edges are clamped
    /// to [`MAX_COORD`] in magnitude, so width and height always fit.
    #[must_use]
    pub fn round_out(rect: kurbo::Rect) -> Self {
        if !(rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite())
        {
            return Self::EMPTY;
        }
        let r = rect.abs().expand();
        Self::from_ltrb(
            saturate(r.x0),
            saturate(r.y0),
            saturate(r.x1),
            saturate(r.y1),
        )
    }

    /// Converts to a floating-point rect.
    #[inline]
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.left()),
            f64::from(self.top()),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

impl fmt::Debug for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelRect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Largest edge coordinate [`PixelRect::round_out`] produces.
pub const MAX_COORD: i32 = i32::MAX / 2;

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is already integral and clamped to the MAX_COORD range"
)]
fn saturate(v: f64) -> i32 {
    v.clamp(f64::from(-MAX_COORD), f64::from(MAX_COORD)) as i32
}
