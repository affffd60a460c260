// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Planeshift uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! limit per-frame recomputation of the layer tree. Each channel represents an
//! independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`TRANSFORM`], [`OPACITY`], and [`CLIP`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent. World transforms, effective opacities,
//!   effective hidden state, and inherited clip rects are all inherited.
//!   (Hidden-flag changes are routed through [`TRANSFORM`].)
//!
//! - **Local-only**: [`BOUNDS`] and [`CONTENT`] only mark the modified layer.
//!
//! - **Structural**: [`TOPOLOGY`] triggers a rebuild of the traversal order
//!   and of the traversal index.
//!
//! # Consumption
//!
//! Each [`LayerStore::evaluate`](crate::layer::LayerStore::evaluate) call
//! drains all channels and reports the results as
//! [`FrameChanges`](crate::layer::FrameChanges).

use understory_dirty::Channel;

/// Transform or hidden flag changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Opacity changed.
pub const OPACITY: Channel = Channel::new(1);

/// Clip shape changed; descendants' inherited clip must be recomputed.
pub const CLIP: Channel = Channel::new(2);

/// Content changed.
pub const CONTENT: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);

/// Bounds size changed; only the layer's own absolute bounds move.
pub const BOUNDS: Channel = Channel::new(5);

/// Channels whose values a child inherits from its parent.
pub const INHERITED: [Channel; 3] = [TRANSFORM, OPACITY, CLIP];
