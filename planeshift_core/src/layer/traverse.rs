// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Iterators over tree links.

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

#[derive(Clone, Copy, Debug)]
enum Link {
    NextSibling,
    Parent,
}

/// Follows one kind of link from layer to layer until it runs out.
///
/// Returned by [`LayerStore::children`] (back to front) and
/// [`LayerStore::ancestors`] (nearest first).
#[derive(Clone, Debug)]
pub struct Walk<'a> {
    store: &'a LayerStore,
    next: u32,
    link: Link,
}

impl<'a> Walk<'a> {
    pub(crate) fn siblings_from(store: &'a LayerStore, first: u32) -> Self {
        Self {
            store,
            next: first,
            link: Link::NextSibling,
        }
    }

    pub(crate) fn parents_from(store: &'a LayerStore, parent: u32) -> Self {
        Self {
            store,
            next: parent,
            link: Link::Parent,
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.next == INVALID {
            return None;
        }
        let idx = self.next;
        let links = match self.link {
            Link::NextSibling => &self.store.next_sibling,
            Link::Parent => &self.store.parent,
        };
        self.next = links[idx as usize];
        Some(self.store.id_at(idx))
    }
}
