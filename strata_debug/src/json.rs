// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recordings and layout frames.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes them as a JSON array with one object per event. [`frame`]
//! captures the visible items of one evaluation pass, and [`export_session`]
//! writes both together.

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::stack::InvalidationReason;
use strata_core::update::ChangeKind;
use strata_core::{ItemId, VisibleItem};

use crate::recorder::{RecordedEvent, decode};

/// Converts recorded bytes to one JSON object per event.
#[must_use]
pub fn events(bytes: &[u8]) -> Vec<Value> {
    decode(bytes).map(event).collect()
}

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &events(bytes))?;
    Ok(())
}

/// Snapshot of one pass: its depth position and every visible item,
/// back to front.
#[must_use]
pub fn frame(depth: f64, items: impl IntoIterator<Item = VisibleItem>) -> Value {
    let items: Vec<Value> = items
        .into_iter()
        .map(|item| {
            json!({
                "id": item.id.0,
                "rank": item.rank,
                "lane": format!("{:?}", item.lane),
                "scale": item.attributes.scale,
                "vertical_offset": item.attributes.vertical_offset,
                "opacity": item.attributes.opacity,
                "normalized_offset": item.attributes.normalized_offset,
            })
        })
        .collect();
    json!({ "depth": depth, "items": items })
}

/// Writes `{ "events": [...], "frames": [...] }` for a whole session.
pub fn export_session(bytes: &[u8], frames: &[Value], writer: &mut dyn Write) -> io::Result<()> {
    let session = json!({ "events": events(bytes), "frames": frames });
    serde_json::to_writer_pretty(writer, &session)?;
    Ok(())
}

fn anchor(id: Option<ItemId>) -> Value {
    id.map_or(Value::Null, |id| json!(id.0))
}

fn event(recorded: RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::Invalidate(e) => json!({
            "event": "Invalidate",
            "reason": match e.reason {
                InvalidationReason::ItemSetChanged => "ItemSetChanged",
                InvalidationReason::BoundsChanged => "BoundsChanged",
            },
        }),
        RecordedEvent::Rebuild(e) => json!({
            "event": "Rebuild",
            "item_count": e.item_count,
            "upper": e.upper,
            "lower": e.lower,
            "unresolved": e.unresolved,
            "extent": e.extent,
        }),
        RecordedEvent::Evaluate(e) => json!({
            "event": "Evaluate",
            "depth": e.depth,
            "updated": e.updated,
            "shown": e.shown,
            "hidden": e.hidden,
            "topology_changed": e.topology_changed,
        }),
        RecordedEvent::BatchBegin(e) => json!({
            "event": "BatchBegin",
            "depth_before": e.depth_before,
            "anchor": anchor(e.anchor),
            "inserted": e.inserted,
            "deleted": e.deleted,
            "target_depth": e.target_depth,
            "auto_scroll": e.auto_scroll,
        }),
        RecordedEvent::Compensation(e) => json!({
            "event": "Compensation",
            "item": e.item.0,
            "kind": match e.kind {
                ChangeKind::Insert => "Insert",
                ChangeKind::Delete => "Delete",
            },
            "delta": e.delta,
        }),
        RecordedEvent::BatchEnd(e) => json!({
            "event": "BatchEnd",
            "inserted": e.inserted,
            "deleted": e.deleted,
            "moved": e.moved,
            "scroll_delta": e.scroll_delta,
            "auto_scroll": e.auto_scroll,
        }),
        RecordedEvent::Settle(e) => json!({
            "event": "Settle",
            "near": e.near,
            "settled": e.settled,
        }),
        RecordedEvent::ItemAttributesCount { depth, count } => json!({
            "event": "ItemAttributes",
            "depth": depth,
            "count": count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use strata_core::trace::{BatchBeginEvent, InvalidateEvent, SettleEvent, TraceSink};
    use strata_core::{DepthStack, ItemList, Lane, LayoutConfig, StackItem};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_invalidate(&InvalidateEvent {
            reason: InvalidationReason::ItemSetChanged,
        });
        rec.on_batch_begin(&BatchBeginEvent {
            depth_before: 0.0,
            anchor: None,
            inserted: 1,
            deleted: 0,
            target_depth: 300.0,
            auto_scroll: true,
        });
        rec.on_settle(&SettleEvent {
            near: 260.0,
            settled: 300.0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["event"], "Invalidate");
        assert_eq!(parsed[0]["reason"], "ItemSetChanged");
        assert_eq!(parsed[1]["anchor"], Value::Null);
        assert_eq!(parsed[1]["auto_scroll"], true);
        assert_eq!(parsed[2]["settled"], 300.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn frame_lists_visible_items_back_to_front() {
        let list = ItemList::from_items([
            StackItem::new(1, Lane::Lower, 1.0),
            StackItem::new(2, Lane::Upper, 2.0),
        ]);
        let mut stack = DepthStack::new(LayoutConfig::time_machine());
        stack.prepare(&list);
        let _ = stack.evaluate(0.0);

        let value = frame(stack.depth_position(), stack.visible());
        assert_eq!(value["depth"], 0.0);
        let items = value["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 2);
        assert_eq!(items[0]["lane"], "Upper");
        assert_eq!(items[1]["id"], 1);
        assert_eq!(items[1]["opacity"], 1.0);
    }

    #[test]
    fn session_holds_events_and_frames() {
        let mut out = Vec::new();
        let frames = [frame(0.0, [])];
        export_session(&[], &frames, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["events"].as_array().map(Vec::len), Some(0));
        assert_eq!(parsed["frames"].as_array().map(Vec::len), Some(1));
    }
}
