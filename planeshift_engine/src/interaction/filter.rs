// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pass B: filter interaction.
//!
//! A filter samples whatever is drawn under its footprint. An overlay plane
//! is not part of that image, so a layer under a filter stays on the overlay
//! path only when the filter is provably drawn above it with a cached result
//! that is still valid.

use planeshift_core::decision::DisabledReason;
use planeshift_core::layer::LayerStore;
use planeshift_core::trace::Stage;

use crate::candidate::{Candidate, PassContext};
use crate::config::{Capability, PolicySnapshot};
use crate::frame::FilterRegion;

/// Runs pass B for every filter region against every candidate.
pub fn run(
    store: &LayerStore,
    candidates: &mut [Candidate],
    filters: &[FilterRegion],
    policy: &PolicySnapshot,
    ctx: &mut PassContext<'_, '_>,
) {
    for filter in filters {
        for candidate in candidates.iter_mut() {
            if candidate.excluded
                || !candidate.is_enabled()
                || !candidate.abs_rect.intersects(filter.footprint)
            {
                continue;
            }
            if let Some(reason) = verdict(store, candidate, filter, policy) {
                ctx.disable(candidate, Stage::Filter, reason);
            }
        }
    }
}

/// Why `filter` forces `candidate` off the overlay path, if it does.
fn verdict(
    store: &LayerStore,
    candidate: &Candidate,
    filter: &FilterRegion,
    policy: &PolicySnapshot,
) -> Option<DisabledReason> {
    if !filter.clean {
        return Some(DisabledReason::DirtyFilter);
    }
    if !store.is_alive(filter.owner) {
        return Some(DisabledReason::FilterUnresolved);
    }
    let owner = filter.owner.index();
    let layer = candidate.idx;
    if !store.share_root_at(owner, layer) {
        return Some(DisabledReason::FilterUnresolved);
    }
    let allowed = policy.has_capability(&candidate.bundle, Capability::FilterUnderOverlay)
        && owner != layer
        && store.draws_after_at(owner, layer)
        && !store.is_ancestor_at(layer, owner);
    (!allowed).then_some(DisabledReason::CleanFilter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use planeshift_core::buffer::BufferDescriptor;
    use planeshift_core::layer::{LayerContent, LayerId, SurfaceContent, SurfaceId};
    use planeshift_core::rect::PixelRect;
    use planeshift_core::trace::Tracer;

    struct Fixture {
        store: LayerStore,
        video: LayerId,
        blur: LayerId,
        inner_blur: LayerId,
        other_tree: LayerId,
    }

    /// root ─┬─ video ── inner_blur
    ///       └─ blur
    /// other_tree (separate root)
    fn fixture() -> Fixture {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let video = store.create_layer();
        let blur = store.create_layer();
        let inner_blur = store.create_layer();
        let other_tree = store.create_layer();
        for id in [root, video, blur, inner_blur, other_tree] {
            store.set_bounds(id, Size::new(100.0, 100.0));
        }
        store.set_content(
            video,
            LayerContent::Surface(
                SurfaceContent::new(SurfaceId(1), "video".into())
                    .with_buffer(BufferDescriptor::new(100, 100)),
            ),
        );
        store.add_child(root, video);
        store.add_child(root, blur);
        store.add_child(video, inner_blur);
        store.evaluate();
        Fixture {
            store,
            video,
            blur,
            inner_blur,
            other_tree,
        }
    }

    fn run_with(f: &Fixture, filter: FilterRegion, policy: &PolicySnapshot) -> Candidate {
        let mut c = Candidate::from_store(&f.store, f.video.index()).unwrap();
        c.abs_rect = PixelRect::new(0, 0, 100, 100);
        c.dst = c.abs_rect;
        let mut candidates = [c];
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        run(&f.store, &mut candidates, &[filter], policy, &mut ctx);
        let [c] = candidates;
        c
    }

    fn region(owner: LayerId, clean: bool) -> FilterRegion {
        FilterRegion {
            owner,
            footprint: PixelRect::new(50, 50, 10, 10),
            clean,
        }
    }

    fn allow_video() -> PolicySnapshot {
        let mut policy = PolicySnapshot::conservative();
        policy.grant("video", Capability::FilterUnderOverlay);
        policy
    }

    #[test]
    fn dirty_filter_always_disables() {
        let f = fixture();
        let c = run_with(&f, region(f.blur, false), &allow_video());
        assert_eq!(c.decision.reason(), Some(DisabledReason::DirtyFilter));
    }

    #[test]
    fn clean_filter_above_with_allowance_is_fine() {
        let f = fixture();
        let c = run_with(&f, region(f.blur, true), &allow_video());
        assert!(c.is_enabled(), "{:?}", c.decision);
    }

    #[test]
    fn clean_filter_without_allowance_disables() {
        let f = fixture();
        let c = run_with(&f, region(f.blur, true), &PolicySnapshot::conservative());
        assert_eq!(c.decision.reason(), Some(DisabledReason::CleanFilter));
    }

    #[test]
    fn clean_filter_inside_own_subtree_disables() {
        let f = fixture();
        let c = run_with(&f, region(f.inner_blur, true), &allow_video());
        assert_eq!(c.decision.reason(), Some(DisabledReason::CleanFilter));
    }

    #[test]
    fn unrelated_owner_is_unresolved() {
        let f = fixture();
        let c = run_with(&f, region(f.other_tree, true), &allow_video());
        assert_eq!(c.decision.reason(), Some(DisabledReason::FilterUnresolved));
    }

    #[test]
    fn dead_owner_is_unresolved() {
        let mut f = fixture();
        f.store.destroy_layer(f.other_tree);
        f.store.evaluate();
        let c = run_with(&f, region(f.other_tree, true), &allow_video());
        assert_eq!(c.decision.reason(), Some(DisabledReason::FilterUnresolved));
    }

    #[test]
    fn filter_outside_the_layer_is_ignored() {
        let f = fixture();
        let mut filter = region(f.blur, false);
        filter.footprint = PixelRect::new(500, 500, 10, 10);
        let c = run_with(&f, filter, &PolicySnapshot::conservative());
        assert!(c.is_enabled());
    }
}
