// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer* is a node in the scene being composed. Each layer has:
//!
//! - An identity ([`LayerId`]), a generational handle that becomes stale when
//!   the layer is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//!   Later siblings paint above earlier ones.
//! - **Local properties** set by the scene graph:
//!   [`transform`](LayerStore::set_transform),
//!   [`opacity`](LayerStore::set_opacity), [`clip`](LayerStore::set_clip),
//!   [`bounds`](LayerStore::set_bounds), [`content`](LayerStore::set_content),
//!   and [`flags`](LayerStore::set_flags).
//! - **Computed properties** produced by [`evaluate`](LayerStore::evaluate):
//!   `world_transform`, `effective_opacity`, `effective_hidden`, screen-space
//!   `abs_bounds`, and the `inherited_clip` from ancestors.
//!
//! Evaluation also builds a traversal index: every layer's position in
//! depth-first pre-order (back to front), the end of its subtree range, and
//! its root. Ancestry and paint-order queries such as
//! [`is_ancestor_at`](LayerStore::is_ancestor_at) are O(1) lookups into it.
//!
//! Layers are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.

mod clip;
mod content;
mod evaluate;
mod id;
mod store;
mod traverse;

pub use clip::ClipShape;
pub use content::{Bundle, LayerContent, SurfaceContent, SurfaceFlags};
pub use evaluate::FrameChanges;
pub use id::{INVALID, LayerId, SurfaceId};
pub use store::{LayerFlags, LayerStore};
pub use traverse::Walk;
