// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving the layer tree for a frame.
//!
//! [`LayerStore::evaluate`] brings every computed property up to date:
//!
//! 1. If the topology changed, rebuild the back-to-front traversal and the
//!    per-layer subtree ranges.
//! 2. Drain `TRANSFORM` (parent first) into world transforms and effective
//!    hidden state, then `OPACITY` into effective opacities.
//! 3. Drain `CLIP` and `BOUNDS`, and recompute screen-space bounds and
//!    inherited clips for every layer touched by steps 2 or 3, in traversal
//!    order.
//! 4. Drain `CONTENT` and `TOPOLOGY`; nothing is derived from them here.
//!
//! [`FrameChanges`] reports raw slot indices, matching the `*_at` accessors.

use alloc::vec::Vec;
use core::mem;

use kurbo::{Point, Rect};
use understory_dirty::Channel;

use super::id::INVALID;
use super::store::{LayerStore, OrderSlot};
use crate::dirty;
use crate::transform::Transform3d;

/// What one [`LayerStore::evaluate`] call recomputed, as slot indices.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// World transform recomputed.
    pub transforms: Vec<u32>,
    /// Effective opacity recomputed.
    pub opacities: Vec<u32>,
    /// Own or inherited clip changed.
    pub clips: Vec<u32>,
    /// Bounds size changed.
    pub bounds: Vec<u32>,
    /// Content replaced.
    pub content: Vec<u32>,
    /// Became effectively hidden.
    pub hidden: Vec<u32>,
    /// Stopped being effectively hidden.
    pub unhidden: Vec<u32>,
    /// Created since the previous evaluate.
    pub added: Vec<u32>,
    /// Destroyed since the previous evaluate.
    pub removed: Vec<u32>,
    /// The traversal was rebuilt.
    pub topology_changed: bool,
}

impl LayerStore {
    /// Recomputes everything marked dirty since the last call and reports
    /// what changed.
    ///
    /// Must run after scene mutations and before the store is handed to the
    /// offload engine.
    pub fn evaluate(&mut self) -> FrameChanges {
        let topology_changed = mem::take(&mut self.traversal_dirty);
        if topology_changed {
            self.rebuild_traversal_order();
        }

        let transforms = self.drain_affected(dirty::TRANSFORM);
        let mut hidden = Vec::new();
        let mut unhidden = Vec::new();
        for &idx in &transforms {
            let i = idx as usize;
            let (parent_world, parent_hidden) = match self.parent[i] {
                INVALID => (Transform3d::IDENTITY, false),
                p => (self.world_transform[p as usize], self.effective_hidden[p as usize]),
            };
            self.world_transform[i] = parent_world * self.local_transform[i];

            let now_hidden = parent_hidden || self.flags[i].hidden;
            if now_hidden != self.effective_hidden[i] {
                if now_hidden {
                    hidden.push(idx);
                } else {
                    unhidden.push(idx);
                }
                self.effective_hidden[i] = now_hidden;
            }
        }

        let opacities = self.drain_affected(dirty::OPACITY);
        for &idx in &opacities {
            let i = idx as usize;
            let parent_opacity = match self.parent[i] {
                INVALID => 1.0,
                p => self.effective_opacity[p as usize],
            };
            self.effective_opacity[i] = parent_opacity * self.local_opacity[i];
        }

        let clips = self.drain_affected(dirty::CLIP);
        let bounds = self.drain_local(dirty::BOUNDS);
        let mut geometry: Vec<u32> = transforms
            .iter()
            .chain(&clips)
            .chain(&bounds)
            .copied()
            .filter(|&idx| self.order[idx as usize].order != INVALID)
            .collect();
        geometry.sort_unstable_by_key(|&idx| self.order[idx as usize].order);
        geometry.dedup();
        for idx in geometry {
            self.recompute_geometry(idx);
        }

        let content = self.drain_local(dirty::CONTENT);
        self.drain_local(dirty::TOPOLOGY);

        FrameChanges {
            transforms,
            opacities,
            clips,
            bounds,
            content,
            hidden,
            unhidden,
            added: mem::take(&mut self.pending_added),
            removed: mem::take(&mut self.pending_removed),
            topology_changed,
        }
    }

    /// All live layers back to front: depth-first pre-order over each root
    /// in slot order.
    ///
    /// Stale until [`evaluate`](Self::evaluate) has run after the last
    /// topology change.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn drain_affected(&mut self, channel: Channel) -> Vec<u32> {
        self.dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect()
    }

    fn drain_local(&mut self, channel: Channel) -> Vec<u32> {
        self.dirty.drain(channel).deterministic().run().collect()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot indices are u32, so the traversal never holds more than u32::MAX layers"
    )]
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        self.order.fill(OrderSlot::DETACHED);

        let mut stack = Vec::new();
        for root in 0..self.len {
            if !self.live[root as usize] || self.parent[root as usize] != INVALID {
                continue;
            }
            // A child is pushed after its next sibling so the whole child
            // subtree is visited first.
            stack.push(root);
            while let Some(idx) = stack.pop() {
                self.order[idx as usize] = OrderSlot {
                    order: self.traversal_order.len() as u32,
                    end: INVALID,
                    root,
                };
                self.traversal_order.push(idx);
                let next = self.next_sibling[idx as usize];
                if idx != root && next != INVALID {
                    stack.push(next);
                }
                let child = self.first_child[idx as usize];
                if child != INVALID {
                    stack.push(child);
                }
            }
        }

        // A subtree ends where its last child's subtree ends. Walking
        // backwards sees every child before its parent.
        for k in (0..self.traversal_order.len()).rev() {
            let idx = self.traversal_order[k] as usize;
            let mut last = self.first_child[idx];
            while last != INVALID && self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.order[idx].end = if last == INVALID {
                k as u32 + 1
            } else {
                self.order[last as usize].end
            };
        }
    }

    /// The parent's geometry must already be current.
    fn recompute_geometry(&mut self, idx: u32) {
        let i = idx as usize;
        let local = Rect::from_origin_size(Point::ORIGIN, self.bounds[i]);
        self.abs_bounds[i] = self.world_transform[i].to_affine().transform_rect_bbox(local);

        let p = self.parent[i];
        self.inherited_clip[i] = if p == INVALID {
            None
        } else {
            let p = p as usize;
            let parent_own = self.clip[p].map(|clip| {
                self.world_transform[p]
                    .to_affine()
                    .transform_rect_bbox(clip.bounding_rect())
            });
            match (self.inherited_clip[p], parent_own) {
                (Some(a), Some(b)) => Some(a.intersect(b)),
                (a, b) => a.or(b),
            }
        };
    }
}
