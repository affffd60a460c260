// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage.
//!
//! Every per-layer property lives in its own `Vec`, indexed by slot. Handles
//! carry a generation so that a slot recycled after
//! [`destroy_layer`](LayerStore::destroy_layer) rejects the old handle.
//!
//! The offload passes walk the evaluated traversal by raw slot index and use
//! the `*_at` accessors, which skip generation checks. Ancestry and
//! paint-order queries read the `OrderSlot` filled by evaluation and are
//! constant time.

use alloc::vec::Vec;

use kurbo::{Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::transform::Transform3d;

use super::clip::ClipShape;
use super::content::LayerContent;
use super::id::{INVALID, LayerId};
use super::traverse::Walk;

/// Per-layer flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// Hides the layer and its whole subtree. Hidden layers are never offload
    /// candidates, but their properties stay current.
    pub hidden: bool,
}

/// Where a layer sits in the evaluated traversal.
///
/// `order..end` is the pre-order range covered by the layer's subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OrderSlot {
    pub(crate) order: u32,
    pub(crate) end: u32,
    pub(crate) root: u32,
}

impl OrderSlot {
    pub(crate) const DETACHED: Self = Self {
        order: INVALID,
        end: INVALID,
        root: INVALID,
    };
}

/// Storage for every layer of a scene.
#[derive(Debug)]
pub struct LayerStore {
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // Set by the scene.
    pub(crate) local_transform: Vec<Transform3d>,
    pub(crate) local_opacity: Vec<f32>,
    pub(crate) clip: Vec<Option<ClipShape>>,
    pub(crate) bounds: Vec<Size>,
    pub(crate) content: Vec<LayerContent>,
    pub(crate) flags: Vec<LayerFlags>,

    // Written by `evaluate`.
    pub(crate) world_transform: Vec<Transform3d>,
    pub(crate) effective_opacity: Vec<f32>,
    pub(crate) effective_hidden: Vec<bool>,
    pub(crate) abs_bounds: Vec<Rect>,
    pub(crate) inherited_clip: Vec<Option<Rect>>,
    pub(crate) order: Vec<OrderSlot>,

    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `value` at `i`, growing `v` by one when `i` is a fresh slot.
fn put<T>(v: &mut Vec<T>, i: usize, value: T) {
    if i == v.len() {
        v.push(value);
    } else {
        v[i] = value;
    }
}

/// Generates `*_at` accessors that copy a value out of one SoA column.
macro_rules! slot_getters {
    ($($(#[$doc:meta])* $name:ident: $field:ident -> $ty:ty;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Panics
            ///
            /// Panics if `idx` is not an allocated slot.
            #[must_use]
            pub fn $name(&self, idx: u32) -> $ty {
                self.check_idx(idx);
                self.$field[idx as usize]
            }
        )*
    };
}

impl LayerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            local_opacity: Vec::new(),
            clip: Vec::new(),
            bounds: Vec::new(),
            content: Vec::new(),
            flags: Vec::new(),
            world_transform: Vec::new(),
            effective_opacity: Vec::new(),
            effective_hidden: Vec::new(),
            abs_bounds: Vec::new(),
            inherited_clip: Vec::new(),
            order: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    /// Creates a detached layer: identity transform, opaque, unclipped,
    /// zero-sized, with [`LayerContent::Group`] content.
    pub fn create_layer(&mut self) -> LayerId {
        let idx = match self.free_list.pop() {
            Some(idx) => {
                self.generation[idx as usize] += 1;
                idx
            }
            None => {
                self.generation.push(0);
                self.len += 1;
                self.len - 1
            }
        };
        self.reset_slot(idx);
        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.id_at(idx)
    }

    /// Destroys a layer and recycles its slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer still has children.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy layer with children"
        );
        if self.parent[idx as usize] != INVALID {
            self.unlink(idx);
        }
        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.live[idx as usize] = false;
        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    /// Whether `id` still refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        id.idx < self.len
            && self.live[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Appends `child` as the topmost child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` already has a parent.
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        self.validate_detached(child);
        self.link(child.idx, parent.idx, INVALID);
    }

    /// Inserts `child` directly below `sibling`, under the same parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` already has a parent, or
    /// `sibling` has none.
    pub fn insert_before(&mut self, child: LayerId, sibling: LayerId) {
        self.validate(sibling);
        self.validate_detached(child);
        let parent = self.parent[sibling.idx as usize];
        assert!(parent != INVALID, "sibling has no parent");
        self.link(child.idx, parent, sibling.idx);
    }

    /// Detaches `child` from its parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer has no parent.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        assert!(p != INVALID, "layer has no parent");
        self.unlink(c);
        for channel in dirty::INHERITED {
            self.dirty.remove_dependency(c, p, channel);
            self.dirty.mark_with(c, channel, &EagerPolicy);
        }
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// The parent of a layer.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Direct children, back to front.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Walk<'_> {
        self.validate(id);
        Walk::siblings_from(self, self.first_child[id.idx as usize])
    }

    /// Ancestors, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: LayerId) -> Walk<'_> {
        self.validate(id);
        Walk::parents_from(self, self.parent[id.idx as usize])
    }

    /// The layer's own clip, in its local space.
    #[must_use]
    pub fn clip(&self, id: LayerId) -> Option<ClipShape> {
        self.validate(id);
        self.clip[id.idx as usize]
    }

    /// What the layer displays.
    #[must_use]
    pub fn content(&self, id: LayerId) -> &LayerContent {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// The layer's flags as last set.
    #[must_use]
    pub fn flags(&self, id: LayerId) -> LayerFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Local-to-screen transform as of the last [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_transform(&self, id: LayerId) -> Transform3d {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Opacity multiplied down from the root, as of the last evaluate.
    #[must_use]
    pub fn effective_opacity(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    /// Screen-space bounding box of the layer's bounds, unclipped, as of the
    /// last evaluate.
    #[must_use]
    pub fn abs_bounds(&self, id: LayerId) -> Rect {
        self.validate(id);
        self.abs_bounds[id.idx as usize]
    }

    /// Intersection of the ancestors' clips in screen space, not counting the
    /// layer's own clip. `None` when no ancestor clips.
    #[must_use]
    pub fn inherited_clip(&self, id: LayerId) -> Option<Rect> {
        self.validate(id);
        self.inherited_clip[id.idx as usize]
    }

    /// Sets the transform relative to the parent.
    pub fn set_transform(&mut self, id: LayerId, transform: Transform3d) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the layer's own opacity.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        self.validate(id);
        self.local_opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets or clears the clip applied to the layer and its descendants.
    pub fn set_clip(&mut self, id: LayerId, clip: Option<ClipShape>) {
        self.validate(id);
        self.clip[id.idx as usize] = clip;
        self.dirty.mark_with(id.idx, dirty::CLIP, &EagerPolicy);
    }

    /// Sets the size of the layer in local units.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Size) {
        self.validate(id);
        self.bounds[id.idx as usize] = bounds;
        self.dirty.mark(id.idx, dirty::BOUNDS);
    }

    /// Sets what the layer displays.
    pub fn set_content(&mut self, id: LayerId, content: LayerContent) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the layer's flags.
    pub fn set_flags(&mut self, id: LayerId, flags: LayerFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        // Hidden state is inherited along with the transform.
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    // Raw slot access. Indices come from `traversal_order()` or from
    // another `*_at` accessor; none of these check generations.

    /// The current handle for slot `idx`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> LayerId {
        self.check_idx(idx);
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Content at slot `idx`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> &LayerContent {
        self.check_idx(idx);
        &self.content[idx as usize]
    }

    slot_getters! {
        /// World transform at slot `idx`.
        world_transform_at: world_transform -> Transform3d;
        /// Effective opacity at slot `idx`.
        effective_opacity_at: effective_opacity -> f32;
        /// Whether slot `idx` is hidden, by itself or an ancestor.
        effective_hidden_at: effective_hidden -> bool;
        /// Own clip at slot `idx`, in local space.
        clip_at: clip -> Option<ClipShape>;
        /// Local bounds size at slot `idx`.
        bounds_at: bounds -> Size;
        /// Screen-space bounds at slot `idx`.
        abs_bounds_at: abs_bounds -> Rect;
        /// Inherited screen-space clip at slot `idx`.
        inherited_clip_at: inherited_clip -> Option<Rect>;
        /// Parent slot of `idx`, or [`INVALID`].
        parent_at: parent -> u32;
        /// Slot of the sibling painted directly below `idx`, or [`INVALID`].
        prev_sibling_at: prev_sibling -> u32;
    }

    /// Position of `idx` in paint order; larger paints later. [`INVALID`]
    /// for layers not yet evaluated.
    #[must_use]
    pub fn order_index_at(&self, idx: u32) -> u32 {
        self.check_idx(idx);
        self.order[idx as usize].order
    }

    /// Whether `ancestor` is a strict ancestor of `idx`.
    #[must_use]
    pub fn is_ancestor_at(&self, ancestor: u32, idx: u32) -> bool {
        self.check_idx(ancestor);
        self.check_idx(idx);
        let a = self.order[ancestor as usize];
        let i = self.order[idx as usize].order;
        a.order != INVALID && i != INVALID && a.order < i && i < a.end
    }

    /// Whether `a` and `b` belong to the same tree.
    #[must_use]
    pub fn share_root_at(&self, a: u32, b: u32) -> bool {
        self.check_idx(a);
        self.check_idx(b);
        let root = self.order[a as usize].root;
        root != INVALID && root == self.order[b as usize].root
    }

    /// Whether `a` paints above `b`.
    #[must_use]
    pub fn draws_after_at(&self, a: u32, b: u32) -> bool {
        self.order_index_at(a) > self.order_index_at(b)
    }

    fn reset_slot(&mut self, idx: u32) {
        let i = idx as usize;
        put(&mut self.parent, i, INVALID);
        put(&mut self.first_child, i, INVALID);
        put(&mut self.next_sibling, i, INVALID);
        put(&mut self.prev_sibling, i, INVALID);
        put(&mut self.local_transform, i, Transform3d::IDENTITY);
        put(&mut self.local_opacity, i, 1.0);
        put(&mut self.clip, i, None);
        put(&mut self.bounds, i, Size::ZERO);
        put(&mut self.content, i, LayerContent::Group);
        put(&mut self.flags, i, LayerFlags::default());
        put(&mut self.world_transform, i, Transform3d::IDENTITY);
        put(&mut self.effective_opacity, i, 1.0);
        put(&mut self.effective_hidden, i, false);
        put(&mut self.abs_bounds, i, Rect::ZERO);
        put(&mut self.inherited_clip, i, None);
        put(&mut self.order, i, OrderSlot::DETACHED);
        put(&mut self.live, i, true);
    }

    /// Links `c` under `p` directly below `next`, or on top when `next` is
    /// [`INVALID`], and marks the inherited channels of `c`'s subtree.
    fn link(&mut self, c: u32, p: u32, next: u32) {
        let prev = if next == INVALID {
            let mut last = self.first_child[p as usize];
            while last != INVALID && self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            last
        } else {
            self.prev_sibling[next as usize]
        };

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = prev;
        self.next_sibling[c as usize] = next;
        if prev == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[prev as usize] = c;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = c;
        }

        for channel in dirty::INHERITED {
            let _ = self.dirty.add_dependency(c, p, channel);
            self.dirty.mark_with(c, channel, &EagerPolicy);
        }
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Splices `idx` out of its sibling list. Dirty state is left alone.
    fn unlink(&mut self, idx: u32) {
        let i = idx as usize;
        let (p, prev, next) = (self.parent[i], self.prev_sibling[i], self.next_sibling[i]);
        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }
        self.parent[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.next_sibling[i] = INVALID;
    }

    fn validate(&self, id: LayerId) {
        assert!(
            self.is_alive(id),
            "stale LayerId: {id:?} (current gen: {})",
            self.generation.get(id.idx as usize).copied().unwrap_or(INVALID)
        );
    }

    fn validate_detached(&self, child: LayerId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
    }

    fn check_idx(&self, idx: u32) {
        assert!(idx < self.len, "slot index {idx} out of range (len {})", self.len);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn ids(walk: Walk<'_>) -> Vec<LayerId> {
        walk.collect()
    }

    #[test]
    fn recycled_slot_rejects_old_handle() {
        let mut store = LayerStore::new();
        let old = store.create_layer();
        store.destroy_layer(old);
        assert!(!store.is_alive(old));

        let new = store.create_layer();
        assert_eq!(new.index(), old.index(), "slot is reused");
        assert_ne!(new, old);
        assert!(store.is_alive(new));
        assert!(!store.is_alive(old));
        assert_eq!(store.clip(new), None, "recycled slot starts clean");
    }

    #[test]
    fn siblings_keep_paint_order() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let video = store.create_layer();
        let controls = store.create_layer();
        let backdrop = store.create_layer();
        store.add_child(root, video);
        store.add_child(root, controls);
        store.insert_before(backdrop, video);
        assert_eq!(ids(store.children(root)), [backdrop, video, controls]);
        assert_eq!(store.prev_sibling_at(video.index()), backdrop.index());
        assert_eq!(store.parent(controls), Some(root));
        assert_eq!(store.parent(root), None);
    }

    #[test]
    fn remove_from_parent_makes_a_root() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let a = store.create_layer();
        let b = store.create_layer();
        store.add_child(root, a);
        store.add_child(root, b);
        store.remove_from_parent(a);
        assert_eq!(ids(store.children(root)), [b]);
        assert_eq!(store.parent(a), None);
        assert_eq!(store.prev_sibling_at(b.index()), INVALID);
    }

    #[test]
    fn ancestors_nearest_first() {
        let mut store = LayerStore::new();
        let window = store.create_layer();
        let panel = store.create_layer();
        let surface = store.create_layer();
        store.add_child(window, panel);
        store.add_child(panel, surface);
        assert_eq!(ids(store.ancestors(surface)), [panel, window]);
        assert!(ids(store.ancestors(window)).is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot destroy layer with children")]
    fn destroy_with_children_panics() {
        let mut store = LayerStore::new();
        let parent = store.create_layer();
        let child = store.create_layer();
        store.add_child(parent, child);
        store.destroy_layer(parent);
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn stale_handle_panics_on_mutation() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.destroy_layer(id);
        store.set_opacity(id, 0.5);
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn adding_an_attached_child_panics() {
        let mut store = LayerStore::new();
        let a = store.create_layer();
        let b = store.create_layer();
        let c = store.create_layer();
        store.add_child(a, c);
        store.add_child(b, c);
    }

    #[test]
    fn queries_before_evaluate_are_detached() {
        let mut store = LayerStore::new();
        let a = store.create_layer();
        let b = store.create_layer();
        store.add_child(a, b);
        assert_eq!(store.order_index_at(b.index()), INVALID);
        assert!(!store.is_ancestor_at(a.index(), b.index()));
        assert!(!store.share_root_at(a.index(), b.index()));
    }

    #[test]
    fn set_flags_round_trips() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.set_flags(id, LayerFlags { hidden: true });
        assert!(store.flags(id).hidden);
    }
}
