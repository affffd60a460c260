// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pass A: occlusion against neighbors, and the transparency settle sweep.
//!
//! The sweep visits candidates topmost first and keeps the destination rects
//! seen so far. A candidate is disabled when it sits under something it
//! cannot be composed beneath:
//!
//! 1. already disabled: just record it;
//! 2. cropped under any recorded rect (unless vendor-forced, hinted, or the
//!    bundle pair may overlap);
//! 3. transparent and overlapping a disabled recorded rect;
//! 4. overlapping an enabled layer of another bundle without a shared
//!    overlap allowance;
//! 5. a rounded corner of its nearest clipping ancestor overlapping a
//!    recorded rect (protected layers exempt).

use planeshift_core::decision::DisabledReason;
use planeshift_core::layer::{Bundle, ClipShape, LayerStore};
use planeshift_core::rect::PixelRect;
use planeshift_core::trace::Stage;

use crate::candidate::{Candidate, PassContext};
use crate::config::PolicySnapshot;

/// A rect recorded during one sweep.
#[derive(Clone, Debug)]
struct OcclusionEntry {
    dst: PixelRect,
    bundle: Bundle,
    disabled: bool,
}

/// Runs pass A over `candidates`, which are in paint order (back to front).
pub fn run(
    store: &LayerStore,
    candidates: &mut [Candidate],
    policy: &PolicySnapshot,
    ctx: &mut PassContext<'_, '_>,
) {
    let mut seen: Vec<OcclusionEntry> = Vec::with_capacity(candidates.len());

    for candidate in candidates.iter_mut().rev().filter(|c| !c.excluded) {
        if candidate.is_enabled()
            && let Some(reason) = blocked_by(store, candidate, &seen, policy)
        {
            ctx.disable(candidate, Stage::Occlusion, reason);
        }
        seen.push(OcclusionEntry {
            dst: candidate.dst,
            bundle: candidate.bundle.clone(),
            disabled: !candidate.is_enabled(),
        });
    }
}

fn blocked_by(
    store: &LayerStore,
    candidate: &Candidate,
    seen: &[OcclusionEntry],
    policy: &PolicySnapshot,
) -> Option<DisabledReason> {
    let dst = candidate.dst;
    let overlapping = || seen.iter().filter(move |e| e.dst.intersects(dst));

    if candidate.cropped
        && !candidate.flags.vendor_forced_direct
        && !candidate.flags.hardware_hint
        && overlapping().any(|e| !policy.overlap_allowed(&e.bundle, &candidate.bundle))
    {
        return Some(DisabledReason::CroppedUnderNeighbor);
    }
    if candidate.is_transparent() && overlapping().any(|e| e.disabled) {
        return Some(DisabledReason::TransparentOverDisabled);
    }
    if overlapping().any(|e| {
        !e.disabled && e.bundle != candidate.bundle && !policy.overlap_allowed(&e.bundle, &candidate.bundle)
    }) {
        return Some(DisabledReason::CrossAppOverlap);
    }
    if !candidate.flags.protected {
        let corners = rounded_corners(store, candidate);
        if corners
            .iter()
            .any(|corner| seen.iter().any(|e| e.dst.intersects(*corner)))
        {
            return Some(DisabledReason::RoundedCornerOverlap);
        }
    }
    None
}

/// Screen-space corner boxes of the nearest clipping ancestor that overlap
/// the candidate. Empty if that clip has square corners.
fn rounded_corners(store: &LayerStore, candidate: &Candidate) -> Vec<PixelRect> {
    let Some((ancestor, clip)) = store
        .ancestors(candidate.layer)
        .find_map(|a| store.clip(a).map(|clip| (a, clip)))
    else {
        return Vec::new();
    };
    if !matches!(clip, ClipShape::RoundedRect(_)) {
        return Vec::new();
    }
    let to_screen = store.world_transform(ancestor).to_affine();
    clip.corner_boxes()
        .into_iter()
        .flatten()
        .map(|corner| PixelRect::round_out(to_screen.transform_rect_bbox(corner)).intersect(candidate.dst))
        .filter(|corner| !corner.is_empty())
        .collect()
}

/// Disables enabled transparent candidates that overlap a disabled one, in
/// either z direction, until nothing changes.
///
/// Pass A only sees disabled layers below the one it visits; this catches
/// the rest, including layers disabled by passes B and C.
pub fn settle(candidates: &mut [Candidate], ctx: &mut PassContext<'_, '_>) {
    loop {
        let disabled: Vec<PixelRect> = candidates
            .iter()
            .filter(|c| !c.excluded && !c.is_enabled())
            .map(|c| c.dst)
            .collect();
        let mut changed = false;
        for candidate in candidates.iter_mut() {
            if candidate.excluded || !candidate.is_enabled() || !candidate.is_transparent() {
                continue;
            }
            if disabled.iter().any(|rect| rect.intersects(candidate.dst)) {
                changed |= ctx.disable(candidate, Stage::Settle, DisabledReason::TransparentOverDisabled);
            }
        }
        if !changed {
            return;
        }
    }
}
