// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON reports for planeshift offload decisions.
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](planeshift_core::trace::TraceSink)
//!   that prints one line per event.
//! - [`report`]: [`FrameDecision`](planeshift_engine::FrameDecision) and
//!   [`Statistics`](planeshift_engine::Statistics) as JSON for dumping and
//!   diffing.

pub mod pretty;
pub mod report;
