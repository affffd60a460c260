// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Policy configuration.
//!
//! A [`PolicySnapshot`] is an immutable view of everything the policy
//! subsystem decides: per-bundle [`Capability`] grants, the expand-screen
//! restriction, protected-content handling, and the numeric tunables in
//! [`EngineConfig`]. Snapshots are loaded from TOML:
//!
//! ```toml
//! format = 1
//! version = 7
//! disable_on_expand = true
//!
//! [engine]
//! aspect_tolerance = 0.02
//!
//! [bundles]
//! "com.example.video" = ["filter_under_overlay", "overlap"]
//! "com.example.launcher" = ["solid_color_layer"]
//! ```
//!
//! Every field is optional. A file that cannot be read or parsed yields
//! [`PolicySnapshot::conservative`] through
//! [`load_or_conservative`](PolicySnapshot::load_or_conservative).

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use planeshift_core::layer::Bundle;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Policy file format understood by this build.
pub const POLICY_FORMAT: u32 = 1;

/// A per-bundle permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Layers may stay on the overlay path under a valid (clean) filter.
    FilterUnderOverlay,
    /// Zero-buffer layers may use the solid-color overlay path.
    SolidColorLayer,
    /// Layers may overlap overlay layers of other bundles that also hold
    /// this capability.
    Overlap,
}

/// Numeric tunables of the decision passes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest deviation, in degrees, from a multiple of 90° that still
    /// counts as axis-aligned.
    pub rotation_epsilon_degrees: f64,
    /// Largest normalized skew (cosine of the angle between the mapped axes)
    /// that still counts as orthogonal.
    pub skew_epsilon: f64,
    /// Largest relative difference between buffer and bounds aspect ratios.
    pub aspect_tolerance: f64,
    /// Smallest background alpha usable for the solid-color path.
    pub solid_min_alpha: u8,
    /// Solid-color layers allowed per frame.
    pub max_solid_layers: u32,
    /// First API version whose surfaces get content-fit destination trimming.
    pub fit_aware_api_version: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rotation_epsilon_degrees: 0.01,
            skew_epsilon: 1e-4,
            aspect_tolerance: 0.01,
            solid_min_alpha: u8::MAX,
            max_solid_layers: 2,
            fit_aware_api_version: 18,
        }
    }
}

/// Handling of protected (DRM) surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectedPolicy {
    /// Clear the global-position flag on protected layers.
    pub clear_global_position: bool,
    /// Clear the cross-node flag on protected layers.
    pub clear_cross_node: bool,
}

impl Default for ProtectedPolicy {
    fn default() -> Self {
        Self {
            clear_global_position: true,
            clear_cross_node: true,
        }
    }
}

/// An immutable, versioned policy configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySnapshot {
    /// File format; must equal [`POLICY_FORMAT`].
    pub format: u32,
    /// Monotonic version assigned by the publisher.
    pub version: u64,
    /// Disable all overlays on secondary expand-mode displays.
    pub disable_on_expand: bool,
    /// Protected-content handling.
    pub protected: ProtectedPolicy,
    /// Tunables.
    pub engine: EngineConfig,
    /// Capabilities granted per bundle name.
    pub bundles: BTreeMap<String, BTreeSet<Capability>>,
}

impl Default for PolicySnapshot {
    fn default() -> Self {
        Self::conservative()
    }
}

impl PolicySnapshot {
    /// The most conservative policy: no capabilities, expand restriction off.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            format: POLICY_FORMAT,
            version: 0,
            disable_on_expand: false,
            protected: ProtectedPolicy::default(),
            engine: EngineConfig::default(),
            bundles: BTreeMap::new(),
        }
    }

    /// Whether `bundle` holds `capability`.
    #[must_use]
    pub fn has_capability(&self, bundle: &Bundle, capability: Capability) -> bool {
        self.bundles
            .get(bundle.as_str())
            .is_some_and(|caps| caps.contains(&capability))
    }

    /// Whether two bundles may overlap on the overlay path.
    #[must_use]
    pub fn overlap_allowed(&self, a: &Bundle, b: &Bundle) -> bool {
        self.has_capability(a, Capability::Overlap) && self.has_capability(b, Capability::Overlap)
    }

    /// Grants `capability` to `bundle`.
    pub fn grant(&mut self, bundle: &str, capability: Capability) {
        self.bundles
            .entry(bundle.to_owned())
            .or_default()
            .insert(capability);
    }

    /// Parses a policy from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::UnsupportedFormat`] for a foreign format number.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let snapshot: Self = toml::from_str(text)?;
        if snapshot.format != POLICY_FORMAT {
            return Err(ConfigError::UnsupportedFormat {
                found: snapshot.format,
                expected: POLICY_FORMAT,
            });
        }
        Ok(snapshot)
    }

    /// Loads a policy from a TOML file.
    ///
    /// # Errors
    ///
    /// See [`from_toml_str`](Self::from_toml_str); also returns
    /// [`ConfigError::Io`] if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Loads a policy, or returns [`conservative`](Self::conservative) if it
    /// cannot be loaded.
    pub fn load_or_conservative<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!(
                    "using conservative offload policy, {}: {err}",
                    path.as_ref().display()
                );
                Self::conservative()
            }
        }
    }
}
