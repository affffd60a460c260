// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON reports of frame decisions and statistics.
//!
//! The output is meant for dumping to a file and diffing between runs, so
//! layers keep their paint order and reasons use their display strings.

use std::io::{self, Write};

use serde_json::{Value, json};

use planeshift_core::decision::DisabledReason;
use planeshift_core::rect::PixelRect;
use planeshift_engine::{FrameDecision, Statistics};

fn rect(r: PixelRect) -> Value {
    json!([r.x, r.y, r.width, r.height])
}

/// One frame's decisions as a JSON object.
#[must_use]
pub fn decisions_to_json(frame: &FrameDecision) -> Value {
    let layers: Vec<Value> = frame
        .layers
        .iter()
        .map(|d| {
            let c = d.solid_color;
            json!({
                "layer": d.layer.index(),
                "generation": d.layer.generation(),
                "z": d.z_order,
                "overlay": d.decision.is_eligible(),
                "reason": d.decision.reason().map(|r| r.as_str()),
                "src": rect(d.src),
                "dst": rect(d.dst),
                "clip": d.clip.map(rect),
                "solid_color": (!c.is_transparent()).then(|| json!([c.r, c.g, c.b, c.a])),
                "global_position": d.global_position,
                "cross_node": d.cross_node,
            })
        })
        .collect();
    json!({
        "output": frame.output.0,
        "frame": frame.frame_index,
        "policy_version": frame.policy_version,
        "layers": layers,
    })
}

/// Accumulated statistics as a JSON object. Reasons with a zero count are
/// omitted.
#[must_use]
pub fn statistics_to_json(stats: &Statistics) -> Value {
    let histogram: serde_json::Map<String, Value> = DisabledReason::ALL
        .iter()
        .filter(|r| stats.count(**r) > 0)
        .map(|r| (r.as_str().to_owned(), json!(stats.count(*r))))
        .collect();
    json!({
        "frames": stats.frames,
        "solid_layers": stats.solid_layers,
        "disabled": histogram,
    })
}

/// Writes [`decisions_to_json`] to `writer`, pretty-printed.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_decisions(frame: &FrameDecision, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &decisions_to_json(frame))?;
    writeln!(writer)
}
