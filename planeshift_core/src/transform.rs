// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 4×4 layer transforms and their projection onto the display plane.
//!
//! The scene may rotate layers out of the screen plane or apply perspective,
//! but a display controller can only place axis-aligned 2-D rectangles.
//! [`Transform3d::to_affine`] keeps the part of the matrix that maps the
//! screen plane onto itself, and [`Transform3d::has_depth_terms`] reports
//! whether anything else was dropped.

use core::ops::Mul;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Affine;

/// Column-major 4×4 matrix: `cols[j][i]` is row `i` of column `j`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Columns as `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The identity.
    pub const IDENTITY: Self = Self::from_cols(
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    );

    /// Builds a matrix from its columns.
    #[must_use]
    pub const fn from_cols(x: [f64; 4], y: [f64; 4], z: [f64; 4], w: [f64; 4]) -> Self {
        Self { cols: [x, y, z, w] }
    }

    /// Column `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Translation by `(x, y, z)`.
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.cols[3] = [x, y, z, 1.0];
        t
    }

    /// Scale along each axis.
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_cols(
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Rotation in the screen plane, in radians. Positive angles turn the
    /// x axis towards the y axis.
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self::from_cols(
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Embeds a 2-D affine map. z passes through unchanged.
    #[must_use]
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self::from_cols(
            [a, b, 0.0, 0.0],
            [c, d, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [e, f, 0.0, 1.0],
        )
    }

    /// Whether every entry is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// The screen-plane part of the matrix. Terms involving z or w are
    /// dropped.
    #[must_use]
    pub fn to_affine(self) -> Affine {
        let [x, y, _, w] = self.cols;
        Affine::new([x[0], x[1], y[0], y[1], w[0], w[1]])
    }

    /// Whether [`to_affine`](Self::to_affine) drops anything larger than
    /// `epsilon`: rotation out of the screen plane or perspective.
    ///
    /// Translation along z is ignored since it does not move pixels.
    #[must_use]
    pub fn has_depth_terms(&self, epsilon: f64) -> bool {
        let [x, y, z, w] = self.cols;
        let dropped = [x[2], y[2], z[0], z[1], x[3], y[3], z[3], w[3] - 1.0];
        dropped.iter().any(|v| v.abs() > epsilon)
    }
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    /// `self * rhs` applies `rhs` first.
    fn mul(self, rhs: Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.cols[k][i] * rhs.cols[j][k]).sum();
            }
        }
        Self { cols: out }
    }
}
