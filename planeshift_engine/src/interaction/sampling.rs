// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pass C: active color-sampling regions.
//!
//! A color picker reads back the composed frame, which only contains what the
//! GPU drew.

use planeshift_core::decision::DisabledReason;
use planeshift_core::trace::Stage;

use crate::candidate::{Candidate, PassContext};
use crate::shared::SamplingSnapshot;

/// Disables candidates whose absolute rect meets a sampled region, unless
/// the layer needs GPU upscaling anyway.
pub fn run(candidates: &mut [Candidate], sampling: &SamplingSnapshot, ctx: &mut PassContext<'_, '_>) {
    if sampling.is_empty() {
        return;
    }
    for candidate in candidates.iter_mut() {
        if candidate.excluded || !candidate.is_enabled() || candidate.flags.needs_upscale {
            continue;
        }
        if sampling.regions().any(|region| region.intersects(candidate.abs_rect)) {
            ctx.disable(candidate, Stage::Sampling, DisabledReason::ColorSampling);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use planeshift_core::layer::{LayerContent, LayerStore, SurfaceContent, SurfaceId};
    use planeshift_core::rect::PixelRect;
    use planeshift_core::trace::Tracer;

    fn candidate(needs_upscale: bool) -> Candidate {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_bounds(id, Size::new(100.0, 100.0));
        let mut surface = SurfaceContent::new(SurfaceId(1), "app".into());
        surface.flags.needs_upscale = needs_upscale;
        store.set_content(id, LayerContent::Surface(surface));
        store.evaluate();
        let mut c = Candidate::from_store(&store, id.index()).unwrap();
        c.abs_rect = PixelRect::new(0, 0, 100, 100);
        c
    }

    fn sampled() -> SamplingSnapshot {
        SamplingSnapshot::new().with_region(SurfaceId(7), PixelRect::new(90, 90, 20, 20))
    }

    #[test]
    fn sampled_layer_is_disabled() {
        let mut c = [candidate(false)];
        let mut tracer = Tracer::none();
        run(&mut c, &sampled(), &mut PassContext::new(0, &mut tracer));
        assert_eq!(c[0].decision.reason(), Some(DisabledReason::ColorSampling));
    }

    #[test]
    fn upscaled_layer_is_exempt() {
        let mut c = [candidate(true)];
        let mut tracer = Tracer::none();
        run(&mut c, &sampled(), &mut PassContext::new(0, &mut tracer));
        assert!(c[0].is_enabled());
    }
}
