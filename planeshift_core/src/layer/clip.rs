// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip shape types for layer clipping.

use kurbo::Rect;

/// A shape used to clip a layer's content and descendants, in the layer's
/// local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with rounded corners.
    RoundedRect(kurbo::RoundedRect),
}

impl ClipShape {
    /// The rectangle enclosing the shape.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::RoundedRect(rr) => rr.rect(),
        }
    }

    /// The four corner boxes that a rounded clip masks out, in local space.
    ///
    /// Each box spans one corner's radius in both directions. Square corners
    /// produce no box.
    #[must_use]
    pub fn corner_boxes(&self) -> [Option<Rect>; 4] {
        let Self::RoundedRect(rr) = self else {
            return [None; 4];
        };
        let r = rr.rect();
        let radii = rr.radii();
        let corner = |radius: f64, x0: f64, y0: f64| {
            (radius > 0.0).then(|| Rect::new(x0, y0, x0 + radius, y0 + radius))
        };
        [
            corner(radii.top_left, r.x0, r.y0),
            corner(radii.top_right, r.x1 - radii.top_right, r.y0),
            corner(radii.bottom_right, r.x1 - radii.bottom_right, r.y1 - radii.bottom_right),
            corner(radii.bottom_left, r.x0, r.y1 - radii.bottom_left),
        ]
    }
}
