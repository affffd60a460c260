// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use planeshift_core::trace::{
    FrameBeginEvent, FrameEndEvent, LayerDisabledEvent, LayerGeometry, SolidColorEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    geometry: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            geometry: false,
        }
    }

    /// Also prints one line per candidate with its resolved rects.
    #[must_use]
    pub fn with_geometry(mut self) -> Self {
        self.geometry = true;
        self
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} output={} policy=v{} candidates={}",
            e.frame_index, e.output.0, e.policy_version, e.candidates,
        );
    }

    fn on_layer_disabled(&mut self, e: &LayerDisabledEvent) {
        let _ = writeln!(
            self.writer,
            "[disabled] frame={} layer={} stage={} reason=\"{}\"",
            e.frame_index,
            e.layer.index(),
            e.stage.as_str(),
            e.reason,
        );
    }

    fn on_solid_color(&mut self, e: &SolidColorEvent) {
        let c = e.color;
        let _ = writeln!(
            self.writer,
            "[solid] frame={} layer={} color=#{:02x}{:02x}{:02x}{:02x}",
            e.frame_index,
            e.layer.index(),
            c.r,
            c.g,
            c.b,
            c.a,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} output={} overlay={} gpu={} solid={}",
            e.frame_index, e.output.0, e.overlay, e.gpu, e.solid,
        );
    }

    fn on_layer_geometry(&mut self, frame_index: u64, layers: &[LayerGeometry]) {
        if !self.geometry {
            return;
        }
        for g in layers {
            let _ = writeln!(
                self.writer,
                "[geometry] frame={frame_index} layer={} src={:?} dst={:?}",
                g.layer_index, g.src, g.dst,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planeshift_core::decision::DisabledReason;
    use planeshift_core::layer::LayerStore;
    use planeshift_core::output::OutputId;
    use planeshift_core::rect::PixelRect;
    use planeshift_core::trace::Stage;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_frame() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            output: OutputId(0),
            policy_version: 4,
            candidates: 2,
        });
        sink.on_frame_end(&FrameEndEvent {
            frame_index: 1,
            output: OutputId(0),
            overlay: 1,
            gpu: 1,
            solid: 0,
        });
        let out = output(sink);
        assert!(out.contains("[frame:begin] frame=1"), "got: {out}");
        assert!(out.contains("policy=v4"), "got: {out}");
        assert!(out.contains("overlay=1 gpu=1"), "got: {out}");
    }

    #[test]
    fn pretty_print_disabled_reason() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_layer_disabled(&LayerDisabledEvent {
            frame_index: 9,
            layer,
            stage: Stage::Filter,
            reason: DisabledReason::DirtyFilter,
        });
        let out = output(sink);
        assert!(out.contains("stage=filter"), "got: {out}");
        assert!(out.contains(&DisabledReason::DirtyFilter.to_string()), "got: {out}");
    }

    #[test]
    fn geometry_lines_are_opt_in() {
        let g = [LayerGeometry {
            layer_index: 3,
            src: PixelRect::new(0, 0, 10, 10),
            dst: PixelRect::new(5, 5, 10, 10),
        }];
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_layer_geometry(1, &g);
        assert!(output(quiet).is_empty());

        let mut verbose = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_geometry();
        verbose.on_layer_geometry(1, &g);
        assert!(output(verbose).contains("[geometry] frame=1 layer=3"));
    }
}
