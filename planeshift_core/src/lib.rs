// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types and layer tree for hardware overlay offload decisions.
//!
//! `planeshift_core` provides the data structures the offload engine reads
//! every frame: a tree of layers with resolved screen-space geometry, the
//! value types that describe buffers and displays, and the vocabulary of
//! decisions. It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! ```text
//!   scene graph mutations
//!       │
//!       ▼
//!   LayerStore::evaluate() ──► FrameChanges
//!       │
//!       ▼
//!   world transforms, abs bounds, inherited clips, traversal index
//!       │
//!       ▼
//!   offload engine ──► Eligibility per candidate ──► TraceSink
//! ```
//!
//! **[`layer`]**: Struct-of-arrays layer tree with generational handles.
//! Properties are set by the caller; world transforms, effective opacities,
//! absolute bounds, and inherited clips are computed by evaluation, together
//! with an index that answers ancestry and paint-order queries in O(1).
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`decision`]**: [`Eligibility`](decision::Eligibility), the monotonic
//! per-layer decision, and [`DisabledReason`](decision::DisabledReason).
//!
//! **[`transform`]**: 4×4 transform with projection onto the 2-D affine part.
//!
//! **[`rect`]**, **[`color`]**, **[`buffer`]**, **[`output`]**: pixel
//! rectangles, fill colors, buffer descriptors, and display geometry.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types with a
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-layer
//!   geometry events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod buffer;
pub mod color;
pub mod decision;
pub mod dirty;
pub mod layer;
pub mod output;
pub mod rect;
pub mod trace;
pub mod transform;
