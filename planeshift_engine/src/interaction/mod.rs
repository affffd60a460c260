// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-layer passes.
//!
//! These run after the local checks, in a fixed order: [`occlusion`] (pass
//! A), [`filter`] (pass B), [`sampling`] (pass C), and finally
//! [`occlusion::settle`]. Each pass may only disable candidates. Candidates
//! excluded by a resolution failure are invisible to all of them.

pub mod filter;
pub mod occlusion;
pub mod sampling;
