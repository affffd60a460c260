// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame hardware overlay offload decisions.
//!
//! Once per frame and per display, [`OffloadEngine::prepare`] inspects every
//! overlay candidate in an evaluated [`LayerStore`](planeshift_core::layer::LayerStore)
//! and decides whether it may be composed directly by the display controller
//! or must go through the GPU.
//!
//! ```text
//!   Aggregator::reset
//!       │
//!   policy::clear_protected_flags
//!       │
//!   geometry::resolve ──► dst, src, cropped
//!       │
//!   policy::resolve_solid_color + eligibility::check
//!       │
//!   policy::apply_expand_screen
//!       │
//!   interaction: occlusion (A) ─► filter (B) ─► sampling (C) ─► settle
//!       │
//!   Aggregator::finalize ──► FrameDecision
//! ```
//!
//! Passes only ever disable a candidate; see
//! [`Eligibility`](planeshift_core::decision::Eligibility).
//!
//! Policy comes from an immutable [`PolicySnapshot`] that is loaded from TOML
//! and shared across displays through [`SharedPolicy`].
//!
//! # Crate features
//!
//! - `trace`: forwards to `planeshift_core/trace`.
//! - `trace-rich` (implies `trace`): also emits per-layer geometry events.

pub mod aggregate;
pub mod candidate;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod interaction;
pub mod policy;
pub mod shared;

pub use aggregate::{FrameDecision, LayerDecision, Statistics};
pub use config::{Capability, EngineConfig, PolicySnapshot};
pub use engine::OffloadEngine;
pub use error::{ConfigError, ResolutionError};
pub use frame::{FilterRegion, FrameInput};
pub use shared::{SamplingSnapshot, SharedPolicy, SharedSampling};
