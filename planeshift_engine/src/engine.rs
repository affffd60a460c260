// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-display decision driver.

use planeshift_core::decision::DisabledReason;
use planeshift_core::layer::LayerStore;
use planeshift_core::trace::{FrameBeginEvent, FrameEndEvent, Stage, Tracer};
#[cfg(feature = "trace-rich")]
use planeshift_core::trace::LayerGeometry;

use crate::aggregate::{Aggregator, FrameDecision, Statistics};
use crate::candidate::{Candidate, PassContext};
use crate::config::PolicySnapshot;
use crate::frame::FrameInput;
use crate::shared::SamplingSnapshot;
use crate::{eligibility, geometry, interaction, policy};

/// Decides, once per frame, which layers of one display go on the overlay
/// path.
///
/// Use one engine per display. Engines share nothing but the policy and
/// sampling snapshots they are handed.
#[derive(Debug, Default)]
pub struct OffloadEngine {
    aggregator: Aggregator,
    #[cfg(feature = "trace-rich")]
    geometry: Vec<LayerGeometry>,
}

impl OffloadEngine {
    /// Creates an engine with empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every pass over the candidates in `store` and returns the frame's
    /// decisions.
    ///
    /// `store` must have been evaluated since its last mutation. The result
    /// depends only on the arguments: calling this twice with the same inputs
    /// yields the same decisions.
    pub fn prepare(
        &mut self,
        store: &LayerStore,
        frame: &FrameInput,
        policy: &PolicySnapshot,
        sampling: &SamplingSnapshot,
        tracer: &mut Tracer<'_>,
    ) -> FrameDecision {
        let screen = &frame.screen;
        self.aggregator.reset();
        let candidates = self.aggregator.candidates_mut();
        candidates.extend(
            store
                .traversal_order()
                .iter()
                .filter_map(|&idx| Candidate::from_store(store, idx)),
        );

        tracer.frame_begin(&FrameBeginEvent {
            frame_index: frame.frame_index,
            output: screen.id,
            policy_version: policy.version,
            candidates: u32::try_from(candidates.len()).unwrap_or(u32::MAX),
        });
        let mut ctx = PassContext::new(frame.frame_index, tracer);

        for candidate in candidates.iter_mut() {
            policy::clear_protected_flags(candidate, &policy.protected);
            if let Err(err) = geometry::resolve(store, candidate, screen, &policy.engine, &mut ctx) {
                log::debug!("frame {}: {err}", frame.frame_index);
                ctx.disable(candidate, Stage::Geometry, DisabledReason::ResolutionError);
                candidate.excluded = true;
            }
        }

        policy::resolve_solid_colors(store, candidates, policy, &mut ctx);
        for candidate in candidates.iter_mut() {
            eligibility::check(candidate, &policy.engine, &mut ctx);
        }
        policy::apply_expand_screen(candidates, screen, policy, &mut ctx);

        interaction::occlusion::run(store, candidates, policy, &mut ctx);
        interaction::filter::run(store, candidates, &frame.filters, policy, &mut ctx);
        interaction::sampling::run(candidates, sampling, &mut ctx);
        interaction::occlusion::settle(candidates, &mut ctx);

        #[cfg(feature = "trace-rich")]
        {
            self.geometry.clear();
            self.geometry.extend(candidates.iter().map(|c| LayerGeometry {
                layer_index: c.idx,
                src: c.src,
                dst: c.dst,
            }));
            ctx.tracer.layer_geometry(frame.frame_index, &self.geometry);
        }

        let decision = self
            .aggregator
            .finalize(screen.id, frame.frame_index, policy.version);
        let gpu = decision.gpu_count();
        let overlay = decision.layers.len() - gpu;
        let solid = decision
            .overlay()
            .filter(|d| !d.solid_color.is_transparent())
            .count();
        log::debug!(
            "frame {} on {:?}: {overlay} overlay, {gpu} gpu, {solid} solid (policy v{})",
            frame.frame_index,
            screen.id,
            policy.version
        );
        tracer.frame_end(&FrameEndEvent {
            frame_index: frame.frame_index,
            output: screen.id,
            overlay: u32::try_from(overlay).unwrap_or(u32::MAX),
            gpu: u32::try_from(gpu).unwrap_or(u32::MAX),
            solid: u32::try_from(solid).unwrap_or(u32::MAX),
        });
        decision
    }

    /// Returns the statistics accumulated since the last call.
    pub fn take_statistics(&mut self) -> Statistics {
        self.aggregator.take_statistics()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
