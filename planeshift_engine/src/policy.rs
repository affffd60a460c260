// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Policy gate: protected content, the expand-screen restriction, and the
//! solid-color path.
//!
//! The cross-app overlap rule is a policy too, but it needs the occlusion
//! sweep's neighbor list and is applied there through
//! [`PolicySnapshot::overlap_allowed`].

use planeshift_core::color::Rgba8;
use planeshift_core::decision::DisabledReason;
use planeshift_core::layer::{INVALID, LayerContent, LayerStore};
use planeshift_core::output::{CompositeType, ScreenInfo};
use planeshift_core::rect::PixelRect;
use planeshift_core::trace::{SolidColorEvent, Stage};

use crate::candidate::{Candidate, PassContext};
use crate::config::{Capability, PolicySnapshot, ProtectedPolicy};

/// Clears the placement flags that protected content may not use.
///
/// Runs before geometry so the destination rect is computed from the
/// cleared flags. Never disables.
pub fn clear_protected_flags(candidate: &mut Candidate, policy: &ProtectedPolicy) {
    if !candidate.flags.protected {
        return;
    }
    if policy.clear_global_position {
        candidate.flags.global_position = false;
    }
    if policy.clear_cross_node {
        candidate.flags.cross_node = false;
    }
}

/// Whether overlays are off for the whole of `screen`.
#[must_use]
pub fn expand_screen_restricted(screen: &ScreenInfo, policy: &PolicySnapshot) -> bool {
    screen.composite == CompositeType::Expand && policy.disable_on_expand && !screen.id.is_primary()
}

/// Disables every candidate on a restricted expand-mode screen.
pub fn apply_expand_screen(
    candidates: &mut [Candidate],
    screen: &ScreenInfo,
    policy: &PolicySnapshot,
    ctx: &mut PassContext<'_, '_>,
) {
    if !expand_screen_restricted(screen, policy) {
        return;
    }
    for candidate in candidates.iter_mut().filter(|c| !c.excluded) {
        ctx.disable(candidate, Stage::Policy, DisabledReason::ExpandScreen);
    }
}

/// Resolves the solid-color path for zero-buffer candidates whose bundle
/// holds [`Capability::SolidColorLayer`].
///
/// Candidates are visited back to front, so the per-frame budget goes to the
/// lowest layers first. A candidate that cannot take the path is disabled
/// with [`DisabledReason::SolidColorRejected`]; one without the capability is
/// left for the eligibility check to reject.
pub fn resolve_solid_colors(
    store: &LayerStore,
    candidates: &mut [Candidate],
    policy: &PolicySnapshot,
    ctx: &mut PassContext<'_, '_>,
) {
    let hdr: Vec<(u32, PixelRect)> = candidates
        .iter()
        .filter(|c| c.flags.hdr && !c.excluded)
        .map(|c| (c.z_order, c.dst))
        .collect();
    let mut used = 0;

    for candidate in candidates.iter_mut() {
        if candidate.excluded
            || !candidate.is_enabled()
            || !candidate.has_no_buffer()
            || !policy.has_capability(&candidate.bundle, Capability::SolidColorLayer)
        {
            continue;
        }
        let overlaps_hdr = hdr
            .iter()
            .any(|&(z, rect)| z != candidate.z_order && rect.intersects(candidate.dst));
        let color = if overlaps_hdr || used >= policy.engine.max_solid_layers {
            None
        } else {
            solid_color(store, candidate, policy.engine.solid_min_alpha)
        };
        match color {
            Some(color) => {
                used += 1;
                candidate.solid_color = Some(color);
                ctx.tracer.solid_color(&SolidColorEvent {
                    frame_index: ctx.frame_index,
                    layer: candidate.layer,
                    color,
                });
            }
            None => {
                candidate.solid_color = None;
                ctx.disable(candidate, Stage::Policy, DisabledReason::SolidColorRejected);
            }
        }
    }
}

/// The fill color `candidate` would present on the solid-color path.
fn solid_color(store: &LayerStore, candidate: &Candidate, min_alpha: u8) -> Option<Rgba8> {
    if candidate.flags.hardware_hint || candidate.alpha < 1.0 {
        return None;
    }
    let own = candidate.background.unwrap_or(Rgba8::TRANSPARENT);
    if own.is_opaque_at(min_alpha) {
        Some(own)
    } else if own.is_transparent() {
        inherited_color(store, candidate.idx, candidate.dst, min_alpha)
    } else {
        None
    }
}

/// What one node contributes under a solid layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Under {
    /// Nothing visible under the layer; keep looking further down.
    Continue,
    /// A flat fill that covers the layer.
    Inherit(Rgba8),
    /// Content that would show through.
    Blocked,
}

/// Walks what is drawn before `idx` (lower siblings and their subtrees, then
/// each ancestor and its lower siblings) for a flat fill covering `dst`.
fn inherited_color(store: &LayerStore, idx: u32, dst: PixelRect, min_alpha: u8) -> Option<Rgba8> {
    let mut node = idx;
    loop {
        let mut sibling = store.prev_sibling_at(node);
        while sibling != INVALID {
            match scan_subtree(store, sibling, dst, min_alpha) {
                Under::Continue => {}
                Under::Inherit(color) => return Some(color),
                Under::Blocked => return None,
            }
            sibling = store.prev_sibling_at(sibling);
        }
        let parent = store.parent_at(node);
        if parent == INVALID {
            return None;
        }
        match scan_node(store, parent, dst, min_alpha) {
            Under::Continue => {}
            Under::Inherit(color) => return Some(color),
            Under::Blocked => return None,
        }
        node = parent;
    }
}

fn scan_subtree(store: &LayerStore, idx: u32, dst: PixelRect, min_alpha: u8) -> Under {
    let children: Vec<u32> = store
        .children(store.id_at(idx))
        .map(|child| child.index())
        .collect();
    for &child in children.iter().rev() {
        let under = scan_subtree(store, child, dst, min_alpha);
        if under != Under::Continue {
            return under;
        }
    }
    scan_node(store, idx, dst, min_alpha)
}

fn scan_node(store: &LayerStore, idx: u32, dst: PixelRect, min_alpha: u8) -> Under {
    if store.effective_hidden_at(idx) {
        return Under::Continue;
    }
    let area = PixelRect::round_out(store.abs_bounds_at(idx));
    if !area.intersects(dst) {
        return Under::Continue;
    }
    match store.content_at(idx) {
        LayerContent::Group => Under::Continue,
        LayerContent::Surface(_) | LayerContent::Canvas { draws_content: true, .. } => Under::Blocked,
        LayerContent::Canvas { background, .. } => {
            if background.is_transparent() {
                Under::Continue
            } else if background.is_opaque_at(min_alpha)
                && store.effective_opacity_at(idx) >= 1.0
                && area.contains_rect(dst)
            {
                Under::Inherit(*background)
            } else {
                Under::Blocked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use planeshift_core::buffer::BufferDescriptor;
    use planeshift_core::layer::{Bundle, LayerId, SurfaceContent, SurfaceId};
    use planeshift_core::output::OutputId;
    use planeshift_core::trace::Tracer;
    use planeshift_core::transform::Transform3d;

    use crate::geometry;

    const SCREEN: ScreenInfo = ScreenInfo::new(OutputId::PRIMARY, 1000, 1000);

    fn layer(store: &mut LayerStore, parent: Option<LayerId>, size: f64, content: LayerContent) -> LayerId {
        let id = store.create_layer();
        store.set_bounds(id, Size::new(size, size));
        store.set_content(id, content);
        if let Some(parent) = parent {
            store.add_child(parent, id);
        }
        id
    }

    fn solid_surface(surface: u32, bundle: &str, background: Option<Rgba8>) -> LayerContent {
        let mut s = SurfaceContent::new(SurfaceId(surface), Bundle::new(bundle));
        s.background = background;
        LayerContent::Surface(s)
    }

    fn canvas(background: Rgba8) -> LayerContent {
        LayerContent::Canvas {
            background,
            draws_content: false,
        }
    }

    fn resolved(store: &mut LayerStore, policy: &PolicySnapshot) -> Vec<Candidate> {
        store.evaluate();
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        let mut candidates: Vec<Candidate> = store
            .traversal_order()
            .iter()
            .filter_map(|&idx| Candidate::from_store(store, idx))
            .collect();
        for c in &mut candidates {
            geometry::resolve(store, c, &SCREEN, &policy.engine, &mut ctx).unwrap();
        }
        resolve_solid_colors(store, &mut candidates, policy, &mut ctx);
        candidates
    }

    fn solid_policy() -> PolicySnapshot {
        let mut policy = PolicySnapshot::conservative();
        policy.grant("launcher", Capability::SolidColorLayer);
        policy
    }

    #[test]
    fn protected_flags_are_cleared() {
        let mut store = LayerStore::new();
        let mut surface = SurfaceContent::new(SurfaceId(1), Bundle::new("drm"));
        surface.flags.protected = true;
        surface.flags.cross_node = true;
        surface.flags.global_position = true;
        let id = layer(&mut store, None, 10.0, LayerContent::Surface(surface));
        store.evaluate();

        let mut c = Candidate::from_store(&store, id.index()).unwrap();
        clear_protected_flags(&mut c, &ProtectedPolicy::default());
        assert!(!c.flags.cross_node);
        assert!(!c.flags.global_position);
        assert!(c.is_enabled(), "clearing never disables");
    }

    #[test]
    fn expand_restriction_only_on_secondary_displays() {
        let mut policy = PolicySnapshot::conservative();
        policy.disable_on_expand = true;
        let mut secondary = ScreenInfo::new(OutputId(1), 100, 100);
        secondary.composite = CompositeType::Expand;
        let mut primary = secondary;
        primary.id = OutputId::PRIMARY;

        assert!(expand_screen_restricted(&secondary, &policy));
        assert!(!expand_screen_restricted(&primary, &policy));
        policy.disable_on_expand = false;
        assert!(!expand_screen_restricted(&secondary, &policy));
    }

    #[test]
    fn opaque_own_background_is_used() {
        let mut store = LayerStore::new();
        layer(&mut store, None, 100.0, solid_surface(1, "launcher", Some(Rgba8::WHITE)));
        let candidates = resolved(&mut store, &solid_policy());
        assert_eq!(candidates[0].solid_color, Some(Rgba8::WHITE));
        assert!(candidates[0].is_enabled());
    }

    #[test]
    fn transparent_background_inherits_covering_canvas() {
        let mut store = LayerStore::new();
        let green = Rgba8::new(0, 200, 0, 255);
        let root = layer(&mut store, None, 500.0, canvas(green));
        layer(&mut store, Some(root), 100.0, solid_surface(1, "launcher", None));
        let candidates = resolved(&mut store, &solid_policy());
        assert_eq!(candidates[0].solid_color, Some(green));
    }

    #[test]
    fn surface_below_blocks_inheritance() {
        let mut store = LayerStore::new();
        let root = layer(&mut store, None, 500.0, canvas(Rgba8::BLACK));
        let video = SurfaceContent::new(SurfaceId(9), Bundle::new("video"))
            .with_buffer(BufferDescriptor::new(100, 100));
        layer(&mut store, Some(root), 100.0, LayerContent::Surface(video));
        layer(&mut store, Some(root), 100.0, solid_surface(1, "launcher", None));
        let candidates = resolved(&mut store, &solid_policy());

        let solid = &candidates[1];
        assert_eq!(solid.solid_color, None);
        assert_eq!(solid.decision.reason(), Some(DisabledReason::SolidColorRejected));
    }

    #[test]
    fn overlapping_hdr_surface_rejects_solid_path() {
        let mut store = LayerStore::new();
        let root = layer(&mut store, None, 500.0, LayerContent::Group);
        let mut video = SurfaceContent::new(SurfaceId(9), Bundle::new("video"))
            .with_buffer(BufferDescriptor::new(100, 100));
        video.flags.hdr = true;
        layer(&mut store, Some(root), 100.0, LayerContent::Surface(video));
        let solid = layer(&mut store, Some(root), 100.0, solid_surface(1, "launcher", Some(Rgba8::WHITE)));
        store.set_transform(solid, Transform3d::from_translation(50.0, 50.0, 0.0));

        let candidates = resolved(&mut store, &solid_policy());
        assert!(candidates[0].is_enabled(), "the HDR surface itself is untouched");
        assert_eq!(candidates[1].solid_color, None);
        assert_eq!(
            candidates[1].decision.reason(),
            Some(DisabledReason::SolidColorRejected)
        );

        store.set_transform(solid, Transform3d::from_translation(200.0, 0.0, 0.0));
        let candidates = resolved(&mut store, &solid_policy());
        assert_eq!(candidates[1].solid_color, Some(Rgba8::WHITE));
        assert!(candidates[1].is_enabled());
    }

    #[test]
    fn partial_alpha_background_is_rejected() {
        let mut store = LayerStore::new();
        layer(
            &mut store,
            None,
            100.0,
            solid_surface(1, "launcher", Some(Rgba8::new(0, 0, 0, 128))),
        );
        let candidates = resolved(&mut store, &solid_policy());
        assert_eq!(
            candidates[0].decision.reason(),
            Some(DisabledReason::SolidColorRejected)
        );
    }

    #[test]
    fn budget_limits_solid_layers() {
        let mut store = LayerStore::new();
        let root = layer(&mut store, None, 500.0, LayerContent::Group);
        for surface in 0..3 {
            layer(&mut store, Some(root), 100.0, solid_surface(surface, "launcher", Some(Rgba8::BLACK)));
        }
        let candidates = resolved(&mut store, &solid_policy());
        let solid = candidates.iter().filter(|c| c.solid_color.is_some()).count();
        assert_eq!(solid, 2);
        assert_eq!(
            candidates[2].decision.reason(),
            Some(DisabledReason::SolidColorRejected)
        );
    }

    #[test]
    fn without_capability_the_path_is_not_tried() {
        let mut store = LayerStore::new();
        layer(&mut store, None, 100.0, solid_surface(1, "other", Some(Rgba8::WHITE)));
        let candidates = resolved(&mut store, &solid_policy());
        assert_eq!(candidates[0].solid_color, None);
        assert!(candidates[0].is_enabled(), "left for the eligibility check");
    }

    #[test]
    fn hint_layers_never_go_solid() {
        let mut store = LayerStore::new();
        let mut s = SurfaceContent::new(SurfaceId(1), Bundle::new("launcher"));
        s.background = Some(Rgba8::WHITE);
        s.flags.hardware_hint = true;
        layer(&mut store, None, 100.0, LayerContent::Surface(s));
        let candidates = resolved(&mut store, &solid_policy());
        assert_eq!(
            candidates[0].decision.reason(),
            Some(DisabledReason::SolidColorRejected)
        );
    }
}
