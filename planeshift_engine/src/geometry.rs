// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Destination and source rectangle resolution.
//!
//! The destination rect is where the layer lands on the display, in whole
//! pixels, after inherited clips, the screen edge, and (for fit-aware
//! surfaces) the area actually covered by the buffer. The source rect is the
//! crop of the buffer that fills it, found by mapping the destination back
//! through the inverse placement, the inverse content fit, and the buffer
//! rotation.
//!
//! Source edges round outward (left/top down, right/bottom up) so the crop
//! never under-reads the buffer, then clamp to the buffer.

use kurbo::{Affine, Point, Rect, Size};
use planeshift_core::buffer::{BufferDescriptor, BufferRotation, ContentFit};
use planeshift_core::decision::DisabledReason;
use planeshift_core::layer::LayerStore;
use planeshift_core::output::ScreenInfo;
use planeshift_core::rect::PixelRect;
use planeshift_core::trace::Stage;

use crate::candidate::{Candidate, PassContext};
use crate::config::EngineConfig;
use crate::error::ResolutionError;

/// Determinants smaller than this are treated as singular.
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Float edges this close to an integer are snapped before rounding.
const SNAP: f64 = 1e-6;

/// The transform that places a buffer of `buffer` size (after rotation)
/// inside layer bounds of `bounds` size.
#[must_use]
pub fn fit_transform(fit: ContentFit, bounds: Size, buffer: Size) -> Affine {
    let centered = |bw: f64, bh: f64| {
        Affine::translate(((bounds.width - bw) * 0.5, (bounds.height - bh) * 0.5))
    };
    match fit {
        ContentFit::Resize => Affine::scale_non_uniform(
            bounds.width / buffer.width,
            bounds.height / buffer.height,
        ),
        ContentFit::TopLeft => Affine::IDENTITY,
        ContentFit::Center => centered(buffer.width, buffer.height),
        ContentFit::Contain | ContentFit::Cover => {
            let sx = bounds.width / buffer.width;
            let sy = bounds.height / buffer.height;
            let s = if fit == ContentFit::Contain {
                sx.min(sy)
            } else {
                sx.max(sy)
            };
            centered(buffer.width * s, buffer.height * s) * Affine::scale(s)
        }
    }
}

/// Resolves placement, absolute bounds, destination and source rects for
/// `candidate`.
///
/// Geometric ineligibility (empty destination, singular matrix, degenerate
/// crop) disables the candidate through `ctx`. Inputs that cannot be
/// resolved at all are returned as a [`ResolutionError`].
///
/// # Errors
///
/// Returns an error if the layer is gone, its world transform is not finite,
/// or its bounds are degenerate.
pub fn resolve(
    store: &LayerStore,
    candidate: &mut Candidate,
    screen: &ScreenInfo,
    config: &EngineConfig,
    ctx: &mut PassContext<'_, '_>,
) -> Result<(), ResolutionError> {
    if !store.is_alive(candidate.layer) {
        return Err(ResolutionError::StaleLayer(candidate.layer));
    }
    if !candidate.world.is_finite() {
        return Err(ResolutionError::NonFiniteTransform(candidate.layer));
    }
    let bounds = candidate.bounds;
    if !(bounds.width > 0.0 && bounds.height > 0.0 && bounds.is_finite()) {
        return Err(ResolutionError::DegenerateBounds(candidate.layer));
    }

    // Global-position layers live in the multi-display space.
    let global = candidate.flags.global_position;
    let shift = if global {
        Affine::translate((-f64::from(screen.offset.0), -f64::from(screen.offset.1)))
    } else {
        Affine::IDENTITY
    };
    candidate.placement = shift * candidate.world.to_affine();

    let local = Rect::from_origin_size(Point::ORIGIN, bounds);
    candidate.abs_rect = PixelRect::round_out(candidate.placement.transform_rect_bbox(local));
    candidate.clip = store
        .inherited_clip_at(candidate.idx)
        .map(|clip| PixelRect::round_out(shift.transform_rect_bbox(clip)));

    let mut dst = candidate.abs_rect;
    if let Some(clip) = candidate.clip
        && !candidate.flags.cross_node
    {
        dst = dst.intersect(clip);
    }
    if !global {
        dst = dst.intersect(screen.rect());
    }

    let buffer = candidate.buffer.filter(|b| !b.is_empty());
    if let Some(buffer) = buffer
        && candidate.fit != ContentFit::Resize
        && candidate.api_version >= config.fit_aware_api_version
    {
        let (ow, oh) = buffer.oriented_size();
        let buffer_area = Rect::new(0.0, 0.0, f64::from(ow), f64::from(oh));
        let content = fit_transform(candidate.fit, bounds, buffer_area.size())
            .transform_rect_bbox(buffer_area)
            .intersect(local);
        candidate.cropped = !covers(content, local);
        dst = dst.intersect(PixelRect::round_out(
            candidate.placement.transform_rect_bbox(content),
        ));
    }
    candidate.dst = dst;

    if dst.is_empty() {
        ctx.disable(candidate, Stage::Geometry, DisabledReason::Invisible);
        return Ok(());
    }
    let Some(buffer) = buffer else {
        return Ok(());
    };
    match source_rect(dst, candidate.placement, bounds, buffer, candidate.fit) {
        Ok(src) => candidate.src = src,
        Err(reason) => {
            ctx.disable(candidate, Stage::Geometry, reason);
        }
    }
    Ok(())
}

/// Maps a destination rect back to the buffer crop that fills it.
///
/// # Errors
///
/// Returns [`DisabledReason::IrrecoverableMatrix`] if `placement` (or the fit
/// transform) is singular and [`DisabledReason::InvalidSourceRect`] if the
/// crop is empty after clamping.
pub fn source_rect(
    dst: PixelRect,
    placement: Affine,
    bounds: Size,
    buffer: BufferDescriptor,
    fit: ContentFit,
) -> Result<PixelRect, DisabledReason> {
    let to_local = invert(placement).ok_or(DisabledReason::IrrecoverableMatrix)?;
    let local = to_local.transform_rect_bbox(dst.to_kurbo());

    let (ow, oh) = buffer.oriented_size();
    let oriented_size = Size::new(f64::from(ow), f64::from(oh));
    let to_oriented = invert(fit_transform(fit, bounds, oriented_size))
        .ok_or(DisabledReason::IrrecoverableMatrix)?;
    let oriented = to_oriented.transform_rect_bbox(local);

    // Clamped to the oriented buffer so the rotation below stays in range.
    let ow = i32::try_from(ow).unwrap_or(i32::MAX);
    let oh = i32::try_from(oh).unwrap_or(i32::MAX);
    let l = to_px(snap(oriented.x0).floor()).clamp(0, ow);
    let t = to_px(snap(oriented.y0).floor()).clamp(0, oh);
    let r = to_px(snap(oriented.x1).ceil()).clamp(l, ow);
    let b = to_px(snap(oriented.y1).ceil()).clamp(t, oh);

    // The producer rotated the contents clockwise, so the displayed top-left
    // corner sits at the buffer's top-right for 90 and bottom-left for 270.
    let src = match buffer.rotation {
        BufferRotation::None => PixelRect::from_ltrb(l, t, r, b),
        BufferRotation::Rotate90 => PixelRect::from_ltrb(oh - b, l, oh - t, r),
        BufferRotation::Rotate180 => PixelRect::from_ltrb(ow - r, oh - b, ow - l, oh - t),
        BufferRotation::Rotate270 => PixelRect::from_ltrb(t, ow - r, b, ow - l),
    };
    if src.is_empty() {
        return Err(DisabledReason::InvalidSourceRect);
    }
    Ok(src)
}

/// Inverse of `m`, or `None` if it is singular or not finite.
pub(crate) fn invert(m: Affine) -> Option<Affine> {
    let det = m.determinant();
    (det.is_finite() && det.abs() > SINGULAR_DETERMINANT).then(|| m.inverse())
}

fn covers(inner: Rect, outer: Rect) -> bool {
    inner.x0 <= outer.x0 + SNAP
        && inner.y0 <= outer.y0 + SNAP
        && inner.x1 >= outer.x1 - SNAP
        && inner.y1 >= outer.y1 - SNAP
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP { r } else { v }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate; inputs are already whole numbers"
)]
fn to_px(v: f64) -> i32 {
    v as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use planeshift_core::layer::{
        Bundle, ClipShape, LayerContent, LayerId, SurfaceContent, SurfaceFlags, SurfaceId,
    };
    use planeshift_core::output::OutputId;
    use planeshift_core::trace::Tracer;
    use planeshift_core::transform::Transform3d;

    fn golden_buffer() -> BufferDescriptor {
        BufferDescriptor::new(1080, 1653)
    }

    fn golden_bounds() -> Size {
        Size::new(2440.0, 1080.0)
    }

    #[test]
    fn resize_full_destination_reads_whole_buffer() {
        let src = source_rect(
            PixelRect::new(0, 1000, 2440, 1080),
            Affine::translate((0.0, 1000.0)),
            golden_bounds(),
            golden_buffer(),
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(src, PixelRect::new(0, 0, 1080, 1653));
    }

    #[test]
    fn resize_partial_destination_rounds_outward() {
        let src = source_rect(
            PixelRect::new(0, 1000, 1440, 880),
            Affine::translate((0.0, 800.0)),
            golden_bounds(),
            golden_buffer(),
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(src, PixelRect::new(0, 306, 638, 1347));
    }

    #[test]
    fn top_left_fit_trims_destination_to_buffer() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_bounds(id, golden_bounds());
        store.set_transform(id, Transform3d::from_translation(0.0, 1000.0, 0.0));
        store.set_content(
            id,
            LayerContent::Surface(
                SurfaceContent::new(SurfaceId(1), Bundle::new("app"))
                    .with_buffer(golden_buffer())
                    .with_fit(ContentFit::TopLeft),
            ),
        );
        store.evaluate();

        let mut candidate = Candidate::from_store(&store, id.index()).unwrap();
        let screen = ScreenInfo::new(OutputId::PRIMARY, 1440, 1080);
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        resolve(&store, &mut candidate, &screen, &EngineConfig::default(), &mut ctx).unwrap();

        assert!(candidate.is_enabled(), "{:?}", candidate.decision);
        assert!(candidate.cropped, "buffer is narrower than bounds");
        assert_eq!(candidate.abs_rect, PixelRect::new(0, 1000, 2440, 1080));
        assert_eq!(candidate.dst, PixelRect::new(0, 1000, 1080, 80));
        assert_eq!(candidate.src, PixelRect::new(0, 0, 1080, 80));
    }

    #[test]
    fn legacy_surfaces_skip_fit_trimming() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_bounds(id, golden_bounds());
        store.set_transform(id, Transform3d::from_translation(0.0, 1000.0, 0.0));
        let mut surface = SurfaceContent::new(SurfaceId(1), Bundle::new("app"))
            .with_buffer(golden_buffer())
            .with_fit(ContentFit::TopLeft);
        surface.api_version = 12;
        store.set_content(id, LayerContent::Surface(surface));
        store.evaluate();

        let mut candidate = Candidate::from_store(&store, id.index()).unwrap();
        let screen = ScreenInfo::new(OutputId::PRIMARY, 1440, 1080);
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        resolve(&store, &mut candidate, &screen, &EngineConfig::default(), &mut ctx).unwrap();

        assert!(!candidate.cropped);
        assert_eq!(candidate.dst, PixelRect::new(0, 1000, 1440, 80));
    }

    #[test]
    fn off_screen_layer_is_invisible() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_bounds(id, Size::new(100.0, 100.0));
        store.set_transform(id, Transform3d::from_translation(5000.0, 0.0, 0.0));
        store.set_content(
            id,
            LayerContent::Surface(
                SurfaceContent::new(SurfaceId(1), Bundle::new("app"))
                    .with_buffer(BufferDescriptor::new(100, 100)),
            ),
        );
        store.evaluate();

        let mut candidate = Candidate::from_store(&store, id.index()).unwrap();
        let screen = ScreenInfo::new(OutputId::PRIMARY, 1440, 1080);
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        resolve(&store, &mut candidate, &screen, &EngineConfig::default(), &mut ctx).unwrap();
        assert_eq!(candidate.decision.reason(), Some(DisabledReason::Invisible));
    }

    #[test]
    fn zero_bounds_are_a_resolution_error() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_content(
            id,
            LayerContent::Surface(SurfaceContent::new(SurfaceId(1), Bundle::new("app"))),
        );
        store.evaluate();

        let mut candidate = Candidate::from_store(&store, id.index()).unwrap();
        let screen = ScreenInfo::new(OutputId::PRIMARY, 1440, 1080);
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        let err = resolve(&store, &mut candidate, &screen, &EngineConfig::default(), &mut ctx)
            .unwrap_err();
        assert_eq!(err, ResolutionError::DegenerateBounds(id));
    }

    #[test]
    fn singular_placement_is_irrecoverable() {
        let err = source_rect(
            PixelRect::new(0, 0, 10, 10),
            Affine::scale_non_uniform(1.0, 0.0),
            Size::new(10.0, 10.0),
            BufferDescriptor::new(10, 10),
            ContentFit::Resize,
        )
        .unwrap_err();
        assert_eq!(err, DisabledReason::IrrecoverableMatrix);
    }

    #[test]
    fn rotated_buffer_swaps_axes() {
        // 200x100 buffer presented rotated 90 degrees into 100x200 bounds.
        let buffer = BufferDescriptor::new(200, 100).with_rotation(BufferRotation::Rotate90);
        let bounds = Size::new(100.0, 200.0);
        // Left half of the displayed content.
        let src = source_rect(
            PixelRect::new(0, 0, 50, 200),
            Affine::IDENTITY,
            bounds,
            buffer,
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(src, PixelRect::new(0, 0, 200, 50));

        let full = source_rect(
            PixelRect::new(0, 0, 100, 200),
            Affine::IDENTITY,
            bounds,
            buffer,
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(full, PixelRect::new(0, 0, 200, 100));
    }

    #[test]
    fn rotate_270_reads_the_other_buffer_edge() {
        let buffer = BufferDescriptor::new(200, 100).with_rotation(BufferRotation::Rotate270);
        let src = source_rect(
            PixelRect::new(0, 0, 50, 200),
            Affine::IDENTITY,
            Size::new(100.0, 200.0),
            buffer,
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(src, PixelRect::new(0, 50, 200, 50));
    }

    #[test]
    fn rotate_180_mirrors_both_axes() {
        let buffer = BufferDescriptor::new(200, 100).with_rotation(BufferRotation::Rotate180);
        let bounds = Size::new(200.0, 100.0);
        let left = source_rect(
            PixelRect::new(0, 0, 50, 100),
            Affine::IDENTITY,
            bounds,
            buffer,
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(left, PixelRect::new(150, 0, 50, 100));

        let top = source_rect(
            PixelRect::new(0, 0, 200, 30),
            Affine::IDENTITY,
            bounds,
            buffer,
            ContentFit::Resize,
        )
        .unwrap();
        assert_eq!(top, PixelRect::new(0, 70, 200, 30));
    }

    fn surface_layer(store: &mut LayerStore, bounds: Size, buffer: BufferDescriptor) -> LayerId {
        let id = store.create_layer();
        store.set_bounds(id, bounds);
        store.set_content(
            id,
            LayerContent::Surface(
                SurfaceContent::new(SurfaceId(1), Bundle::new("app")).with_buffer(buffer),
            ),
        );
        id
    }

    fn set_surface_flags(store: &mut LayerStore, id: LayerId, f: impl FnOnce(&mut SurfaceFlags)) {
        let LayerContent::Surface(mut surface) = store.content(id).clone() else {
            panic!("not a surface");
        };
        f(&mut surface.flags);
        store.set_content(id, LayerContent::Surface(surface));
    }

    fn resolved(store: &LayerStore, id: LayerId, screen: &ScreenInfo) -> Candidate {
        let mut candidate = Candidate::from_store(store, id.index()).unwrap();
        let mut tracer = Tracer::none();
        let mut ctx = PassContext::new(0, &mut tracer);
        resolve(store, &mut candidate, screen, &EngineConfig::default(), &mut ctx).unwrap();
        candidate
    }

    #[test]
    fn global_position_is_shifted_and_not_screen_clipped() {
        let mut store = LayerStore::new();
        let id = surface_layer(&mut store, Size::new(2000.0, 500.0), BufferDescriptor::new(2000, 500));
        store.set_transform(id, Transform3d::from_translation(1940.0, 100.0, 0.0));
        set_surface_flags(&mut store, id, |f| f.global_position = true);
        store.evaluate();

        let mut screen = ScreenInfo::new(OutputId(1), 1440, 1080);
        screen.offset = (1440, 0);
        let c = resolved(&store, id, &screen);
        assert!(c.is_enabled(), "{:?}", c.decision());
        assert_eq!(c.abs_rect, PixelRect::new(500, 100, 2000, 500));
        assert_eq!(c.dst, PixelRect::new(500, 100, 2000, 500));
        assert_eq!(c.src, PixelRect::new(0, 0, 2000, 500));

        set_surface_flags(&mut store, id, |f| f.global_position = false);
        store.evaluate();
        let c = resolved(&store, id, &screen);
        assert_eq!(c.abs_rect, PixelRect::new(1940, 100, 2000, 500));
        assert!(c.dst.is_empty());
        assert_eq!(c.decision().reason(), Some(DisabledReason::Invisible));
    }

    #[test]
    fn cross_node_layer_ignores_inherited_clip() {
        let mut store = LayerStore::new();
        let parent = store.create_layer();
        store.set_clip(parent, Some(ClipShape::Rect(Rect::new(0.0, 0.0, 100.0, 100.0))));
        let id = surface_layer(&mut store, Size::new(400.0, 400.0), BufferDescriptor::new(400, 400));
        store.add_child(parent, id);
        store.evaluate();

        let screen = ScreenInfo::new(OutputId::PRIMARY, 1440, 1080);
        let clipped = resolved(&store, id, &screen);
        assert_eq!(clipped.clip, Some(PixelRect::new(0, 0, 100, 100)));
        assert_eq!(clipped.dst, PixelRect::new(0, 0, 100, 100));
        assert_eq!(clipped.src, PixelRect::new(0, 0, 100, 100));

        set_surface_flags(&mut store, id, |f| f.cross_node = true);
        store.evaluate();
        let cross = resolved(&store, id, &screen);
        assert_eq!(cross.dst, PixelRect::new(0, 0, 400, 400));
        assert_eq!(cross.src, PixelRect::new(0, 0, 400, 400));
    }

    #[test]
    fn huge_global_layer_resolves_without_overflow() {
        let mut store = LayerStore::new();
        let id = surface_layer(&mut store, Size::new(5e9, 100.0), BufferDescriptor::new(1000, 100));
        store.set_transform(id, Transform3d::from_translation(-3e9, 0.0, 0.0));
        set_surface_flags(&mut store, id, |f| f.global_position = true);
        store.evaluate();

        let screen = ScreenInfo::new(OutputId::PRIMARY, 1440, 1080);
        let c = resolved(&store, id, &screen);
        assert!(c.is_enabled(), "{:?}", c.decision());
        assert!(c.dst.width > 0);
        assert!(c.dst.left() < 0 && c.dst.right() > 0);
        assert!(!c.src.is_empty());
        assert!(PixelRect::new(0, 0, 1000, 100).contains_rect(c.src));
    }

    #[test]
    fn contain_fit_centers_buffer() {
        let m = fit_transform(
            ContentFit::Contain,
            Size::new(200.0, 100.0),
            Size::new(100.0, 100.0),
        );
        let placed = m.transform_rect_bbox(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(placed, Rect::new(50.0, 0.0, 150.0, 100.0));
    }
}
