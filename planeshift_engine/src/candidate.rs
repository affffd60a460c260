// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame candidate state.
//!
//! A [`Candidate`] is built fresh every frame from one overlay-capable layer
//! of the store. It carries a copy of the surface data (with protected-content
//! clearing applied), the resolved geometry, and the [`Eligibility`] that the
//! passes narrow. Nothing here is written back to the store.

use kurbo::{Affine, Size};
use planeshift_core::buffer::{BufferDescriptor, ContentFit};
use planeshift_core::color::Rgba8;
use planeshift_core::decision::{DisabledReason, Eligibility};
use planeshift_core::layer::{Bundle, LayerId, LayerStore, SurfaceFlags, SurfaceId};
use planeshift_core::rect::PixelRect;
use planeshift_core::trace::{LayerDisabledEvent, Stage, Tracer};
use planeshift_core::transform::Transform3d;

/// One overlay candidate for the current frame.
#[derive(Clone, Debug)]
pub struct Candidate {
    /// Raw store slot.
    pub idx: u32,
    /// Handle of the layer.
    pub layer: LayerId,
    /// Global z-order (pre-order index; larger is on top).
    pub z_order: u32,
    /// Owning application.
    pub bundle: Bundle,
    /// Producer surface.
    pub surface: SurfaceId,
    /// Surface flags after protected-content clearing.
    pub flags: SurfaceFlags,
    /// Current buffer.
    pub buffer: Option<BufferDescriptor>,
    /// Buffer placement.
    pub fit: ContentFit,
    /// API level of the owning application.
    pub api_version: u32,
    /// Own background fill.
    pub background: Option<Rgba8>,
    /// Local bounds size.
    pub bounds: Size,
    /// Accumulated alpha.
    pub alpha: f32,
    /// Layer-to-screen transform as stored.
    pub world: Transform3d,
    /// Screen-space 2-D transform used for placement, including the display
    /// offset for global-position layers.
    pub placement: Affine,
    /// Absolute bounds, pre-clip.
    pub abs_rect: PixelRect,
    /// Inherited clip, if any ancestor clips.
    pub clip: Option<PixelRect>,
    /// Destination rect, post-clip.
    pub dst: PixelRect,
    /// Crop within the buffer.
    pub src: PixelRect,
    /// The buffer does not cover the layer's bounds.
    pub cropped: bool,
    /// Fill color when using the solid-color path.
    pub solid_color: Option<Rgba8>,
    /// Current decision. Narrowed only through [`PassContext::disable`] and
    /// [`Eligibility::disable`], so it never returns to eligible.
    pub(crate) decision: Eligibility,
    /// Resolution failed; later passes skip this candidate.
    pub excluded: bool,
}

impl Candidate {
    /// Builds a candidate from raw slot `idx`, or `None` if the layer is not
    /// an effectively visible self-drawing surface.
    #[must_use]
    pub fn from_store(store: &LayerStore, idx: u32) -> Option<Self> {
        if store.effective_hidden_at(idx) {
            return None;
        }
        let surface = store.content_at(idx).as_surface()?;
        if !surface.flags.self_drawing {
            return None;
        }
        Some(Self {
            idx,
            layer: store.id_at(idx),
            z_order: store.order_index_at(idx),
            bundle: surface.bundle.clone(),
            surface: surface.surface,
            flags: surface.flags,
            buffer: surface.buffer,
            fit: surface.fit,
            api_version: surface.api_version,
            background: surface.background,
            bounds: store.bounds_at(idx),
            alpha: store.effective_opacity_at(idx),
            world: store.world_transform_at(idx),
            placement: Affine::IDENTITY,
            abs_rect: PixelRect::EMPTY,
            clip: None,
            dst: PixelRect::EMPTY,
            src: PixelRect::EMPTY,
            cropped: false,
            solid_color: None,
            decision: Eligibility::Eligible,
            excluded: false,
        })
    }

    /// Whether the layer blends with what is below it.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.alpha < 1.0 || self.solid_color.is_some()
    }

    /// The decision so far.
    #[inline]
    #[must_use]
    pub fn decision(&self) -> Eligibility {
        self.decision
    }

    /// Whether the layer is still on the overlay path.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.decision.is_eligible()
    }

    /// Whether the layer has no buffer to present.
    #[inline]
    #[must_use]
    pub fn has_no_buffer(&self) -> bool {
        self.buffer.is_none_or(BufferDescriptor::is_empty)
    }
}

/// Frame-scoped context threaded through the passes.
#[derive(Debug)]
pub struct PassContext<'t, 'a> {
    /// Frame counter.
    pub frame_index: u64,
    /// Trace event destination.
    pub tracer: &'t mut Tracer<'a>,
}

impl<'t, 'a> PassContext<'t, 'a> {
    /// Creates a context.
    pub fn new(frame_index: u64, tracer: &'t mut Tracer<'a>) -> Self {
        Self {
            frame_index,
            tracer,
        }
    }

    /// Disables `candidate`, recording `reason` if it was still enabled.
    ///
    /// Returns `true` if this call changed the decision.
    pub fn disable(&mut self, candidate: &mut Candidate, stage: Stage, reason: DisabledReason) -> bool {
        if !candidate.decision.disable(reason) {
            return false;
        }
        log::trace!(
            "frame {}: {:?} disabled at {} ({reason})",
            self.frame_index,
            candidate.layer,
            stage.as_str()
        );
        self.tracer.layer_disabled(&LayerDisabledEvent {
            frame_index: self.frame_index,
            layer: candidate.layer,
            stage,
            reason,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use planeshift_core::layer::{LayerContent, SurfaceContent};

    #[test]
    fn decision_only_narrows() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_bounds(id, Size::new(10.0, 10.0));
        store.set_content(
            id,
            LayerContent::Surface(SurfaceContent::new(SurfaceId(1), Bundle::new("app"))),
        );
        store.evaluate();
        let mut c = Candidate::from_store(&store, id.index()).unwrap();
        assert_eq!(c.decision(), Eligibility::Eligible);

        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        assert!(ctx.disable(&mut c, Stage::Eligibility, DisabledReason::NoBuffer));
        assert!(!ctx.disable(&mut c, Stage::Policy, DisabledReason::Forced));
        assert_eq!(c.decision().reason(), Some(DisabledReason::NoBuffer));
        assert!(!c.is_enabled());
    }
}
