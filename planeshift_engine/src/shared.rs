// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot cells shared between per-display engines.
//!
//! Writers publish a whole new snapshot; readers clone the current `Arc` once
//! at frame start, so one frame never sees a half-applied update.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use planeshift_core::layer::SurfaceId;
use planeshift_core::rect::PixelRect;

use crate::config::PolicySnapshot;

/// Shared, versioned policy.
#[derive(Debug)]
pub struct SharedPolicy {
    current: RwLock<Arc<PolicySnapshot>>,
}

impl Default for SharedPolicy {
    fn default() -> Self {
        Self::new(PolicySnapshot::conservative())
    }
}

impl SharedPolicy {
    /// Creates a cell holding `initial`.
    #[must_use]
    pub fn new(initial: PolicySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The snapshot in effect.
    ///
    /// A poisoned lock yields [`PolicySnapshot::conservative`].
    #[must_use]
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(_) => {
                log::warn!("offload policy lock poisoned, using conservative policy");
                Arc::new(PolicySnapshot::conservative())
            }
        }
    }

    /// Replaces the snapshot, assigning it the next version number.
    ///
    /// Returns the assigned version.
    pub fn publish(&self, mut next: PolicySnapshot) -> u64 {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("offload policy lock poisoned, overwriting");
                poisoned.into_inner()
            }
        };
        next.version = guard.version + 1;
        let version = next.version;
        *guard = Arc::new(next);
        version
    }
}

/// Screen regions currently read back by color pickers, keyed by the surface
/// that requested them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplingSnapshot {
    regions: BTreeMap<SurfaceId, PixelRect>,
}

impl SamplingSnapshot {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot with `region` recorded for `surface`.
    #[must_use]
    pub fn with_region(mut self, surface: SurfaceId, region: PixelRect) -> Self {
        self.regions.insert(surface, region);
        self
    }

    /// All active regions.
    pub fn regions(&self) -> impl Iterator<Item = PixelRect> + '_ {
        self.regions.values().copied()
    }

    /// Whether no region is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Shared sampling regions, updated copy-on-write.
#[derive(Debug, Default)]
pub struct SharedSampling {
    current: RwLock<Arc<SamplingSnapshot>>,
}

impl SharedSampling {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The regions in effect. A poisoned lock yields no regions.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SamplingSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(_) => {
                log::warn!("color sampling lock poisoned, ignoring sampling regions");
                Arc::new(SamplingSnapshot::new())
            }
        }
    }

    /// Records or moves the region sampled for `surface`.
    pub fn update(&self, surface: SurfaceId, region: PixelRect) {
        self.modify(|regions| {
            regions.insert(surface, region);
        });
    }

    /// Stops sampling for `surface`.
    pub fn remove(&self, surface: SurfaceId) {
        self.modify(|regions| {
            regions.remove(&surface);
        });
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<SurfaceId, PixelRect>)) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = SamplingSnapshot::clone(&guard);
        f(&mut next.regions);
        *guard = Arc::new(next);
    }
}
