// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_item_attributes`](TraceSink::on_item_attributes)) store
//! only the depth and the item count.

use strata_core::ItemId;
use strata_core::stack::InvalidationReason;
use strata_core::trace::{
    BatchBeginEvent, BatchEndEvent, CompensationEvent, EvaluateEvent, InvalidateEvent,
    ItemAttributesRecord, RebuildEvent, SettleEvent, TraceSink,
};
use strata_core::update::ChangeKind;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_INVALIDATE: u8 = 1;
const TAG_REBUILD: u8 = 2;
const TAG_EVALUATE: u8 = 3;
const TAG_BATCH_BEGIN: u8 = 4;
const TAG_COMPENSATION: u8 = 5;
const TAG_BATCH_END: u8 = 6;
const TAG_SETTLE: u8 = 7;
const TAG_ITEM_ATTRIBUTES_COUNT: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_item(&mut self, v: Option<ItemId>) {
        match v {
            Some(id) => {
                self.write_u8(1);
                self.write_u64(id.0);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_reason(&mut self, r: InvalidationReason) {
        self.write_u8(match r {
            InvalidationReason::ItemSetChanged => 0,
            InvalidationReason::BoundsChanged => 1,
        });
    }

    fn write_kind(&mut self, k: ChangeKind) {
        self.write_u8(match k {
            ChangeKind::Insert => 0,
            ChangeKind::Delete => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        self.write_u8(TAG_INVALIDATE);
        self.write_reason(e.reason);
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        self.write_u8(TAG_REBUILD);
        self.write_count(e.item_count);
        self.write_count(e.upper);
        self.write_count(e.lower);
        self.write_count(e.unresolved);
        self.write_f64(e.extent);
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.write_u8(TAG_EVALUATE);
        self.write_f64(e.depth);
        self.write_count(e.updated);
        self.write_count(e.shown);
        self.write_count(e.hidden);
        self.write_bool(e.topology_changed);
    }

    fn on_batch_begin(&mut self, e: &BatchBeginEvent) {
        self.write_u8(TAG_BATCH_BEGIN);
        self.write_f64(e.depth_before);
        self.write_option_item(e.anchor);
        self.write_count(e.inserted);
        self.write_count(e.deleted);
        self.write_f64(e.target_depth);
        self.write_bool(e.auto_scroll);
    }

    fn on_compensation(&mut self, e: &CompensationEvent) {
        self.write_u8(TAG_COMPENSATION);
        self.write_u64(e.item.0);
        self.write_kind(e.kind);
        self.write_f64(e.delta);
    }

    fn on_batch_end(&mut self, e: &BatchEndEvent) {
        self.write_u8(TAG_BATCH_END);
        self.write_count(e.inserted);
        self.write_count(e.deleted);
        self.write_count(e.moved);
        self.write_f64(e.scroll_delta);
        self.write_bool(e.auto_scroll);
    }

    fn on_settle(&mut self, e: &SettleEvent) {
        self.write_u8(TAG_SETTLE);
        self.write_f64(e.near);
        self.write_f64(e.settled);
    }

    fn on_item_attributes(&mut self, depth: f64, items: &[ItemAttributesRecord]) {
        self.write_u8(TAG_ITEM_ATTRIBUTES_COUNT);
        self.write_f64(depth);
        self.write_count(items.len());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// An [`InvalidateEvent`].
    Invalidate(InvalidateEvent),
    /// A [`RebuildEvent`].
    Rebuild(RebuildEvent),
    /// An [`EvaluateEvent`].
    Evaluate(EvaluateEvent),
    /// A [`BatchBeginEvent`].
    BatchBegin(BatchBeginEvent),
    /// A [`CompensationEvent`].
    Compensation(CompensationEvent),
    /// A [`BatchEndEvent`].
    BatchEnd(BatchEndEvent),
    /// A [`SettleEvent`].
    Settle(SettleEvent),
    /// Visible-item count for a pass.
    ItemAttributesCount {
        /// Depth position of the pass.
        depth: f64,
        /// Number of visible items.
        count: usize,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_count(&mut self) -> Option<usize> {
        Some(usize::try_from(self.read_u64()?).unwrap_or(usize::MAX))
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_option_item(&mut self) -> Option<Option<ItemId>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some((present != 0).then_some(ItemId(val)))
    }

    fn read_reason(&mut self) -> Option<InvalidationReason> {
        Some(match self.read_u8()? {
            0 => InvalidationReason::ItemSetChanged,
            _ => InvalidationReason::BoundsChanged,
        })
    }

    fn read_kind(&mut self) -> Option<ChangeKind> {
        Some(match self.read_u8()? {
            0 => ChangeKind::Insert,
            _ => ChangeKind::Delete,
        })
    }

    fn decode_rebuild(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Rebuild(RebuildEvent {
            item_count: self.read_count()?,
            upper: self.read_count()?,
            lower: self.read_count()?,
            unresolved: self.read_count()?,
            extent: self.read_f64()?,
        }))
    }

    fn decode_evaluate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Evaluate(EvaluateEvent {
            depth: self.read_f64()?,
            updated: self.read_count()?,
            shown: self.read_count()?,
            hidden: self.read_count()?,
            topology_changed: self.read_bool()?,
        }))
    }

    fn decode_batch_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::BatchBegin(BatchBeginEvent {
            depth_before: self.read_f64()?,
            anchor: self.read_option_item()?,
            inserted: self.read_count()?,
            deleted: self.read_count()?,
            target_depth: self.read_f64()?,
            auto_scroll: self.read_bool()?,
        }))
    }

    fn decode_compensation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Compensation(CompensationEvent {
            item: ItemId(self.read_u64()?),
            kind: self.read_kind()?,
            delta: self.read_f64()?,
        }))
    }

    fn decode_batch_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::BatchEnd(BatchEndEvent {
            inserted: self.read_count()?,
            deleted: self.read_count()?,
            moved: self.read_count()?,
            scroll_delta: self.read_f64()?,
            auto_scroll: self.read_bool()?,
        }))
    }

    fn decode_settle(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Settle(SettleEvent {
            near: self.read_f64()?,
            settled: self.read_f64()?,
        }))
    }

    fn decode_item_attributes_count(&mut self) -> Option<RecordedEvent> {
        let depth = self.read_f64()?;
        let count = self.read_count()?;
        Some(RecordedEvent::ItemAttributesCount { depth, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_INVALIDATE => Some(RecordedEvent::Invalidate(InvalidateEvent {
                reason: self.read_reason()?,
            })),
            TAG_REBUILD => self.decode_rebuild(),
            TAG_EVALUATE => self.decode_evaluate(),
            TAG_BATCH_BEGIN => self.decode_batch_begin(),
            TAG_COMPENSATION => self.decode_compensation(),
            TAG_BATCH_END => self.decode_batch_end(),
            TAG_SETTLE => self.decode_settle(),
            TAG_ITEM_ATTRIBUTES_COUNT => self.decode_item_attributes_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
