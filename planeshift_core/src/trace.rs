// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured per-frame diagnostics.
//!
//! The engine reports what it decides through a [`Tracer`]: a frame begins,
//! layers are disabled one by one with the [`Stage`] responsible, solid fills
//! are chosen, and the frame ends with totals. A [`TraceSink`] receives these
//! events. With the `trace-rich` feature the resolved rects of every
//! candidate are reported as well ([`LayerGeometry`]).
//!
//! Nothing here is compiled in unless the `trace` feature is enabled.

use crate::color::Rgba8;
use crate::decision::DisabledReason;
use crate::layer::LayerId;
use crate::output::OutputId;
#[cfg(feature = "trace-rich")]
use crate::rect::PixelRect;

/// Which stage of the decision pipeline disabled a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Destination and source rect resolution.
    Geometry,
    /// Per-layer eligibility predicates.
    Eligibility,
    /// Global policy (expand-screen restriction).
    Policy,
    /// Pass A, occlusion against neighbors.
    Occlusion,
    /// Pass B, filter interaction.
    Filter,
    /// Pass C, color-sampling regions.
    Sampling,
    /// Final transparency sweep.
    Settle,
}

impl Stage {
    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Eligibility => "eligibility",
            Self::Policy => "policy",
            Self::Occlusion => "occlusion",
            Self::Filter => "filter",
            Self::Sampling => "sampling",
            Self::Settle => "settle",
        }
    }
}

/// Emitted when the engine starts processing a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Which display.
    pub output: OutputId,
    /// Version of the policy snapshot in effect.
    pub policy_version: u64,
    /// Number of candidate layers.
    pub candidates: u32,
}

/// Emitted each time a layer is disabled.
#[derive(Clone, Copy, Debug)]
pub struct LayerDisabledEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The disabled layer.
    pub layer: LayerId,
    /// The stage that disabled it.
    pub stage: Stage,
    /// Why.
    pub reason: DisabledReason,
}

/// Emitted when a zero-buffer layer resolves a solid fill color.
#[derive(Clone, Copy, Debug)]
pub struct SolidColorEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The solid layer.
    pub layer: LayerId,
    /// The resolved color.
    pub color: Rgba8,
}

/// Emitted when the engine finalizes a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which display.
    pub output: OutputId,
    /// Layers left on the overlay path.
    pub overlay: u32,
    /// Layers sent to the GPU path.
    pub gpu: u32,
    /// Overlay layers using the solid-color path.
    pub solid: u32,
}

/// Resolved geometry of one candidate layer.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct LayerGeometry {
    /// Index of the layer.
    pub layer_index: u32,
    /// Crop within the buffer.
    pub src: PixelRect,
    /// Placement on screen.
    pub dst: PixelRect,
}

/// Receives trace events from the decision engine.
///
/// Every method defaults to a no-op, so a sink only implements the events it
/// wants.
pub trait TraceSink {
    /// A frame started.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// A layer was moved to the GPU path.
    fn on_layer_disabled(&mut self, e: &LayerDisabledEvent) {
        _ = e;
    }

    /// A zero-buffer layer got a fill color.
    fn on_solid_color(&mut self, e: &SolidColorEvent) {
        _ = e;
    }

    /// A frame was finalized.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Resolved geometry for every candidate of the frame.
    #[cfg(feature = "trace-rich")]
    fn on_layer_geometry(&mut self, frame_index: u64, layers: &[LayerGeometry]) {
        _ = (frame_index, layers);
    }
}

/// Handle the engine emits through, wrapping an optional [`TraceSink`].
///
/// Without the `trace` feature the sink is never stored and every method is
/// empty after inlining. With it, each event costs one `Option` check.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _sink: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Emits to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self::from_option(Some(sink))
    }

    /// Emits nowhere.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::from_option(None)
    }

    #[inline]
    fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _sink: core::marker::PhantomData,
            }
        }
    }

    #[inline]
    fn emit(&mut self, event: impl FnOnce(&mut dyn TraceSink)) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            event(sink);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = event;
        }
    }

    /// See [`TraceSink::on_frame_begin`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        self.emit(|s| s.on_frame_begin(e));
    }

    /// See [`TraceSink::on_layer_disabled`].
    #[inline]
    pub fn layer_disabled(&mut self, e: &LayerDisabledEvent) {
        self.emit(|s| s.on_layer_disabled(e));
    }

    /// See [`TraceSink::on_solid_color`].
    #[inline]
    pub fn solid_color(&mut self, e: &SolidColorEvent) {
        self.emit(|s| s.on_solid_color(e));
    }

    /// See [`TraceSink::on_frame_end`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        self.emit(|s| s.on_frame_end(e));
    }

    /// See [`TraceSink::on_layer_geometry`].
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn layer_geometry(&mut self, frame_index: u64, layers: &[LayerGeometry]) {
        self.emit(|s| s.on_layer_geometry(frame_index, layers));
    }
}
