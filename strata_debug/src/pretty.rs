// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::stack::InvalidationReason;
use strata_core::trace::{
    BatchBeginEvent, BatchEndEvent, CompensationEvent, EvaluateEvent, InvalidateEvent,
    ItemAttributesRecord, RebuildEvent, SettleEvent, TraceSink,
};
use strata_core::update::ChangeKind;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn reason_name(reason: InvalidationReason) -> &'static str {
    match reason {
        InvalidationReason::ItemSetChanged => "items",
        InvalidationReason::BoundsChanged => "bounds",
    }
}

fn kind_name(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Insert => "insert",
        ChangeKind::Delete => "delete",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        let _ = writeln!(self.writer, "[invalidate] {}", reason_name(e.reason));
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuild] items={} upper={} lower={} unresolved={} extent={:.1}",
            e.item_count, e.upper, e.lower, e.unresolved, e.extent,
        );
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        let topology = if e.topology_changed { " topology" } else { "" };
        let _ = writeln!(
            self.writer,
            "[evaluate] depth={:.1} updated={} shown={} hidden={}{topology}",
            e.depth, e.updated, e.shown, e.hidden,
        );
    }

    fn on_batch_begin(&mut self, e: &BatchBeginEvent) {
        let anchor = e.anchor.map_or_else(|| "-".to_owned(), |id| id.0.to_string());
        let auto = if e.auto_scroll { " auto-scroll" } else { "" };
        let _ = writeln!(
            self.writer,
            "[batch:begin] anchor={anchor} +{} -{} depth={:.1} -> {:.1}{auto}",
            e.inserted, e.deleted, e.depth_before, e.target_depth,
        );
    }

    fn on_compensation(&mut self, e: &CompensationEvent) {
        let _ = writeln!(
            self.writer,
            "[compensate] {} item={} delta={:+.1}",
            kind_name(e.kind),
            e.item.0,
            e.delta,
        );
    }

    fn on_batch_end(&mut self, e: &BatchEndEvent) {
        let _ = writeln!(
            self.writer,
            "[batch:end] +{} -{} moved={} delta={:+.1} auto-scroll={}",
            e.inserted, e.deleted, e.moved, e.scroll_delta, e.auto_scroll,
        );
    }

    fn on_settle(&mut self, e: &SettleEvent) {
        let _ = writeln!(
            self.writer,
            "[settle] {:.1} -> {:.1}",
            e.near, e.settled
        );
    }

    fn on_item_attributes(&mut self, depth: f64, items: &[ItemAttributesRecord]) {
        let _ = writeln!(
            self.writer,
            "[items] depth={depth:.1} visible={}",
            items.len(),
        );
        for r in items {
            let _ = writeln!(
                self.writer,
                "  {:>6} {:?} scale={:.3} dy={:.1} alpha={:.3} offset={:+.3}",
                r.item.0,
                r.lane,
                r.attributes.scale,
                r.attributes.vertical_offset,
                r.attributes.opacity,
                r.attributes.normalized_offset,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{ItemAttributes, ItemId, Lane};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_evaluate() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_evaluate(&EvaluateEvent {
            depth: 150.0,
            updated: 2,
            shown: 1,
            hidden: 0,
            topology_changed: true,
        });
        let output = output(sink);
        assert!(output.contains("[evaluate]"), "got: {output}");
        assert!(output.contains("depth=150.0"), "got: {output}");
        assert!(output.contains("topology"), "got: {output}");
    }

    #[test]
    fn pretty_print_batch() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_batch_begin(&BatchBeginEvent {
            depth_before: 150.0,
            anchor: Some(ItemId(20)),
            inserted: 1,
            deleted: 0,
            target_depth: 250.0,
            auto_scroll: false,
        });
        sink.on_compensation(&CompensationEvent {
            item: ItemId(5),
            kind: ChangeKind::Insert,
            delta: 100.0,
        });
        let output = output(sink);
        assert!(output.contains("anchor=20"), "got: {output}");
        assert!(output.contains("150.0 -> 250.0"), "got: {output}");
        assert!(output.contains("insert item=5 delta=+100.0"), "got: {output}");
    }

    #[test]
    fn pretty_print_items_one_line_each() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let records = [
            ItemAttributesRecord {
                item: ItemId(1),
                lane: Lane::Upper,
                attributes: ItemAttributes::IDENTITY,
            },
            ItemAttributesRecord {
                item: ItemId(2),
                lane: Lane::Lower,
                attributes: ItemAttributes::IDENTITY,
            },
        ];
        sink.on_item_attributes(0.0, &records);
        let output = output(sink);
        assert_eq!(output.lines().count(), 3, "got: {output}");
        assert!(output.contains("visible=2"), "got: {output}");
    }
}
