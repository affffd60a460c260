// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Neither error ever reaches the compositor. A [`ResolutionError`] disables
//! the one layer it concerns; a [`ConfigError`] makes the loader fall back to
//! [`PolicySnapshot::conservative`](crate::config::PolicySnapshot::conservative).

use planeshift_core::layer::LayerId;
use thiserror::Error;

/// A layer's inputs could not be resolved this frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionError {
    /// The layer was destroyed after the candidate list was built.
    #[error("layer {0:?} was torn down mid-frame")]
    StaleLayer(LayerId),
    /// The world transform contains NaN or infinity.
    #[error("layer {0:?} has a non-finite world transform")]
    NonFiniteTransform(LayerId),
    /// The layer's bounds are zero-sized or non-finite.
    #[error("layer {0:?} has degenerate bounds")]
    DegenerateBounds(LayerId),
}

/// The policy configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid policy TOML.
    #[error("failed to parse policy file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The file declares a format this build does not understand.
    #[error("unsupported policy format {found} (expected {expected})")]
    UnsupportedFormat {
        /// Format declared in the file.
        found: u32,
        /// Format this build reads.
        expected: u32,
    },
}
