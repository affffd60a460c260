// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer eligibility predicates.
//!
//! Every check here looks at one candidate only, so the result does not
//! depend on the order candidates are visited in.

use kurbo::Affine;
use planeshift_core::buffer::ContentFit;
use planeshift_core::decision::DisabledReason;
use planeshift_core::trace::Stage;
use planeshift_core::transform::Transform3d;

use crate::candidate::{Candidate, PassContext};
use crate::config::EngineConfig;
use crate::geometry;

/// Applies the local predicates to `candidate`.
///
/// Vendor-forced layers and candidates excluded by a resolution failure are
/// left untouched.
pub fn check(candidate: &mut Candidate, config: &EngineConfig, ctx: &mut PassContext<'_, '_>) {
    if candidate.excluded || candidate.flags.vendor_forced_direct {
        return;
    }
    for reason in failures(candidate, config) {
        ctx.disable(candidate, Stage::Eligibility, reason);
    }
}

/// Every predicate that fails for `candidate`, in check order.
fn failures(candidate: &Candidate, config: &EngineConfig) -> Vec<DisabledReason> {
    let mut failed = Vec::new();

    // Matrix checks go first: a rotated layer reports rotation whatever else
    // is wrong with it.
    if geometry::invert(candidate.placement).is_none() {
        failed.push(DisabledReason::IrrecoverableMatrix);
    } else if !is_axis_aligned(&candidate.world, candidate.placement, config) {
        failed.push(DisabledReason::Rotation);
    }
    if candidate.has_no_buffer() && candidate.solid_color.is_none() {
        failed.push(DisabledReason::NoBuffer);
    }
    if !aspect_matches(candidate, config) {
        failed.push(DisabledReason::BufferSizeMismatch);
    }
    if candidate.alpha < 1.0 && candidate.solid_color.is_none() {
        failed.push(DisabledReason::NonOpaque);
    }
    if candidate.flags.force_disabled {
        failed.push(DisabledReason::Forced);
    }
    if !matches!(candidate.fit, ContentFit::Resize | ContentFit::TopLeft)
        && !candidate.flags.protected
    {
        failed.push(DisabledReason::UnsupportedFit);
    }
    failed
}

/// Whether the buffer's aspect ratio (after rotation) matches the bounds
/// within tolerance. Stretched and streamed content always match.
#[must_use]
pub fn aspect_matches(candidate: &Candidate, config: &EngineConfig) -> bool {
    if candidate.fit == ContentFit::Resize || candidate.flags.stream_content {
        return true;
    }
    let Some(buffer) = candidate.buffer.filter(|b| !b.is_empty()) else {
        return true;
    };
    let (w, h) = buffer.oriented_size();
    let buffer_aspect = f64::from(w) / f64::from(h);
    let bounds_aspect = candidate.bounds.width / candidate.bounds.height;
    ((buffer_aspect - bounds_aspect) / bounds_aspect).abs() <= config.aspect_tolerance
}

/// Whether `placement` maps the layer onto the screen as an axis-aligned
/// rectangle: no depth or perspective terms in `world`, no mirroring, no
/// skew, and a rotation that is a multiple of 90°.
#[must_use]
pub fn is_axis_aligned(world: &Transform3d, placement: Affine, config: &EngineConfig) -> bool {
    if world.has_depth_terms(config.skew_epsilon) {
        return false;
    }
    let [a, b, c, d, _, _] = placement.as_coeffs();
    if placement.determinant() < 0.0 {
        return false;
    }
    let x_len = a.hypot(b);
    let y_len = c.hypot(d);
    if x_len == 0.0 || y_len == 0.0 {
        return false;
    }
    // Cosine of the angle between the mapped x and y axes.
    if ((a * c + b * d) / (x_len * y_len)).abs() > config.skew_epsilon {
        return false;
    }
    let off_axis = b.atan2(a).to_degrees().rem_euclid(90.0);
    off_axis.min(90.0 - off_axis) <= config.rotation_epsilon_degrees
}
