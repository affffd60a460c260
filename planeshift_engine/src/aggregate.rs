// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame decision state and telemetry.
//!
//! The [`Aggregator`] owns the candidate list for the frame in flight. It is
//! reset at the start of every frame, and [`finalize`](Aggregator::finalize)
//! turns it into an immutable [`FrameDecision`] while folding the outcome
//! into the running [`Statistics`].

use std::mem;

use planeshift_core::color::Rgba8;
use planeshift_core::decision::{DisabledReason, Eligibility};
use planeshift_core::layer::LayerId;
use planeshift_core::output::OutputId;
use planeshift_core::rect::PixelRect;

use crate::candidate::Candidate;

/// The outcome for one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerDecision {
    /// The layer.
    pub layer: LayerId,
    /// Global z-order (larger is on top).
    pub z_order: u32,
    /// Overlay or GPU, and why.
    pub decision: Eligibility,
    /// Crop within the buffer.
    pub src: PixelRect,
    /// Placement on screen.
    pub dst: PixelRect,
    /// Inherited clip, if any.
    pub clip: Option<PixelRect>,
    /// Fill color on the solid-color path, otherwise transparent.
    pub solid_color: Rgba8,
    /// Placed in multi-display coordinates.
    pub global_position: bool,
    /// Mirrored onto several displays.
    pub cross_node: bool,
}

/// All decisions for one frame on one display, back to front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameDecision {
    /// Which display.
    pub output: OutputId,
    /// Frame counter.
    pub frame_index: u64,
    /// Version of the policy snapshot used.
    pub policy_version: u64,
    /// Per-layer decisions in paint order.
    pub layers: Box<[LayerDecision]>,
}

impl FrameDecision {
    /// The decision for `layer`, if it was a candidate.
    #[must_use]
    pub fn get(&self, layer: LayerId) -> Option<&LayerDecision> {
        self.layers.iter().find(|d| d.layer == layer)
    }

    /// Layers left on the overlay path.
    pub fn overlay(&self) -> impl Iterator<Item = &LayerDecision> {
        self.layers.iter().filter(|d| d.decision.is_eligible())
    }

    /// Number of layers sent to the GPU.
    #[must_use]
    pub fn gpu_count(&self) -> usize {
        self.layers.iter().filter(|d| d.decision.is_disabled()).count()
    }
}

/// Disabled-reason histogram and solid-color usage, accumulated across
/// frames until read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Frames finalized.
    pub frames: u64,
    /// Disabled layers per reason, indexed by [`DisabledReason::index`].
    pub histogram: [u64; DisabledReason::COUNT],
    /// Overlay layers that used the solid-color path.
    pub solid_layers: u64,
}

impl Statistics {
    /// Count for one reason.
    #[must_use]
    pub fn count(&self, reason: DisabledReason) -> u64 {
        self.histogram[reason.index()]
    }

    /// Total disabled layers.
    #[must_use]
    pub fn disabled(&self) -> u64 {
        self.histogram.iter().sum()
    }

    fn record(&mut self, decision: &FrameDecision) {
        self.frames += 1;
        for layer in &decision.layers {
            match layer.decision {
                Eligibility::Disabled(reason) => self.histogram[reason.index()] += 1,
                Eligibility::Eligible if layer.solid_color != Rgba8::TRANSPARENT => {
                    self.solid_layers += 1;
                }
                Eligibility::Eligible => {}
            }
        }
    }
}

/// Owner of the frame in flight.
#[derive(Debug, Default)]
pub struct Aggregator {
    candidates: Vec<Candidate>,
    stats: Statistics,
}

impl Aggregator {
    /// Creates an aggregator with empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous frame's candidates. Statistics are kept.
    pub fn reset(&mut self) {
        self.candidates.clear();
    }

    /// The candidates of the frame in flight.
    pub fn candidates_mut(&mut self) -> &mut Vec<Candidate> {
        &mut self.candidates
    }

    /// The candidates of the frame in flight.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Freezes the frame's decisions and records them in the statistics.
    pub fn finalize(&mut self, output: OutputId, frame_index: u64, policy_version: u64) -> FrameDecision {
        let layers = self
            .candidates
            .iter()
            .map(|c| LayerDecision {
                layer: c.layer,
                z_order: c.z_order,
                decision: c.decision,
                src: c.src,
                dst: c.dst,
                clip: c.clip,
                solid_color: c.solid_color.unwrap_or(Rgba8::TRANSPARENT),
                global_position: c.flags.global_position,
                cross_node: c.flags.cross_node,
            })
            .collect();
        let decision = FrameDecision {
            output,
            frame_index,
            policy_version,
            layers,
        };
        self.stats.record(&decision);
        decision
    }

    /// Returns the statistics accumulated since the last call and starts
    /// over.
    pub fn take_statistics(&mut self) -> Statistics {
        mem::take(&mut self.stats)
    }
}
