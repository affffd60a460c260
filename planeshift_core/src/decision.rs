// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer offload decisions.
//!
//! Every candidate layer starts each frame as [`Eligibility::Eligible`]. The
//! decision passes may only move it to [`Eligibility::Disabled`], and no API
//! moves it back: the only way to obtain a fresh `Eligible` is to build a new
//! value at the start of the next frame. The first reason recorded wins.

use core::fmt;

/// Why a layer was sent to the GPU composition path.
///
/// The discriminant order is stable and is used as the histogram index in
/// telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DisabledReason {
    /// No produced buffer and no solid-color fallback.
    NoBuffer,
    /// Buffer aspect ratio does not match the layer bounds.
    BufferSizeMismatch,
    /// The layer-to-screen transform cannot be inverted.
    IrrecoverableMatrix,
    /// The mapped source crop is degenerate.
    InvalidSourceRect,
    /// Rotation, skew, mirroring, or depth terms the display cannot place.
    Rotation,
    /// Accumulated alpha below 1 without the solid-color path.
    NonOpaque,
    /// Upstream policy, freeze, or suspension.
    Forced,
    /// Content-fit mode the display controller cannot reproduce.
    UnsupportedFit,
    /// Destination rect is empty after clipping.
    Invisible,
    /// Partially cropped layer under an occupied neighbor.
    CroppedUnderNeighbor,
    /// Transparent layer overlapping a GPU-composed neighbor.
    TransparentOverDisabled,
    /// Overlaps a layer of another application without a shared allowance.
    CrossAppOverlap,
    /// A rounded clip corner overlaps a neighbor.
    RoundedCornerOverlap,
    /// Under a filter whose cache is invalid this frame.
    DirtyFilter,
    /// Under a valid filter without the allowance or structural guarantee.
    CleanFilter,
    /// Filter owner could not be related to the layer.
    FilterUnresolved,
    /// Intersects an active color-sampling region.
    ColorSampling,
    /// On a secondary expand-mode display with the restriction enabled.
    ExpandScreen,
    /// Zero-buffer layer that could not take the solid-color path.
    SolidColorRejected,
    /// Inputs were invalid or torn down mid-frame.
    ResolutionError,
}

impl DisabledReason {
    /// Number of variants.
    pub const COUNT: usize = 20;

    /// All variants, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::NoBuffer,
        Self::BufferSizeMismatch,
        Self::IrrecoverableMatrix,
        Self::InvalidSourceRect,
        Self::Rotation,
        Self::NonOpaque,
        Self::Forced,
        Self::UnsupportedFit,
        Self::Invisible,
        Self::CroppedUnderNeighbor,
        Self::TransparentOverDisabled,
        Self::CrossAppOverlap,
        Self::RoundedCornerOverlap,
        Self::DirtyFilter,
        Self::CleanFilter,
        Self::FilterUnresolved,
        Self::ColorSampling,
        Self::ExpandScreen,
        Self::SolidColorRejected,
        Self::ResolutionError,
    ];

    /// Histogram slot for this reason.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoBuffer => "no buffer",
            Self::BufferSizeMismatch => "buffer size mismatch",
            Self::IrrecoverableMatrix => "irrecoverable matrix",
            Self::InvalidSourceRect => "invalid source rect",
            Self::Rotation => "rotation",
            Self::NonOpaque => "non-opaque",
            Self::Forced => "forced",
            Self::UnsupportedFit => "unsupported fit",
            Self::Invisible => "invisible",
            Self::CroppedUnderNeighbor => "below disabled-but-cropped neighbor",
            Self::TransparentOverDisabled => "transparent over disabled neighbor",
            Self::CrossAppOverlap => "cross-app overlap",
            Self::RoundedCornerOverlap => "rounded corner over neighbor",
            Self::DirtyFilter => "under dirty filter",
            Self::CleanFilter => "under clean filter",
            Self::FilterUnresolved => "filter relationship unresolved",
            Self::ColorSampling => "color sampling",
            Self::ExpandScreen => "expand screen",
            Self::SolidColorRejected => "solid color rejected",
            Self::ResolutionError => "resolution error",
        }
    }
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The offload decision for one layer in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Eligibility {
    /// May be placed on a hardware overlay plane.
    #[default]
    Eligible,
    /// Must be composed by the GPU.
    Disabled(DisabledReason),
}

impl Eligibility {
    /// Whether the layer is still eligible.
    #[inline]
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// Whether the layer has been disabled.
    #[inline]
    #[must_use]
    pub const fn is_disabled(self) -> bool {
        !self.is_eligible()
    }

    /// The reason, if disabled.
    #[inline]
    #[must_use]
    pub const fn reason(self) -> Option<DisabledReason> {
        match self {
            Self::Eligible => None,
            Self::Disabled(reason) => Some(reason),
        }
    }

    /// Disables the layer for `reason`.
    ///
    /// Returns `true` if this call changed the state. An already-disabled
    /// layer keeps its original reason.
    pub fn disable(&mut self, reason: DisabledReason) -> bool {
        match self {
            Self::Eligible => {
                *self = Self::Disabled(reason);
                true
            }
            Self::Disabled(_) => false,
        }
    }
}
