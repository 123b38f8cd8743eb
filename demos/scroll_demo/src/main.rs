// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated chat session that exercises the layout engine end to end.
//!
//! Scrolls through a two-lane conversation, settles, receives and deletes
//! messages inside batch updates, and builds render plans along the way.
//! Events go to both a [`PrettyPrintSink`](strata_debug::pretty::PrettyPrintSink)
//! and a [`RecorderSink`](strata_debug::recorder::RecorderSink); the recording
//! and per-pass frames are then written to a JSON file.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Rect, Size};
use serde_json::Value;

use strata_core::trace::{
    BatchBeginEvent, BatchEndEvent, CompensationEvent, EvaluateEvent, InvalidateEvent,
    ItemAttributesRecord, RebuildEvent, SettleEvent, TraceSink, Tracer,
};
use strata_core::{
    DepthStack, InvalidationReason, ItemId, ItemList, Lane, LayoutConfig, StackItem,
};
use strata_debug::pretty::PrettyPrintSink;
use strata_debug::recorder::RecorderSink;
use strata_render::{
    ContentKind, ContentLookup, DamageRegion, DropZone, StackGeometry, StackPlan,
};

const MESSAGES: u64 = 12;
/// Scroll step per simulated frame, in depth units.
const SCROLL_STEP: f64 = 35.0;

/// Fans every event out to the pretty printer and the recorder.
struct Sinks {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Sinks {
    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        self.pretty.on_invalidate(e);
        self.recorder.on_invalidate(e);
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        self.pretty.on_rebuild(e);
        self.recorder.on_rebuild(e);
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.pretty.on_evaluate(e);
        self.recorder.on_evaluate(e);
    }

    fn on_batch_begin(&mut self, e: &BatchBeginEvent) {
        self.pretty.on_batch_begin(e);
        self.recorder.on_batch_begin(e);
    }

    fn on_compensation(&mut self, e: &CompensationEvent) {
        self.pretty.on_compensation(e);
        self.recorder.on_compensation(e);
    }

    fn on_batch_end(&mut self, e: &BatchEndEvent) {
        self.pretty.on_batch_end(e);
        self.recorder.on_batch_end(e);
    }

    fn on_settle(&mut self, e: &SettleEvent) {
        self.pretty.on_settle(e);
        self.recorder.on_settle(e);
    }

    fn on_item_attributes(&mut self, depth: f64, items: &[ItemAttributesRecord]) {
        self.pretty.on_item_attributes(depth, items);
        self.recorder.on_item_attributes(depth, items);
    }
}

/// Message content, keyed by id.
struct Chat;

impl ContentLookup for Chat {
    fn content_kind(&self, id: ItemId) -> ContentKind {
        match id.0 % 5 {
            0 => ContentKind::Image,
            3 => ContentKind::Link,
            _ => ContentKind::Text,
        }
    }

    fn item_size(&self, id: ItemId) -> Size {
        match self.content_kind(id) {
            ContentKind::Image | ContentKind::Video => Size::new(240.0, 180.0),
            ContentKind::Link => Size::new(280.0, 96.0),
            _ => Size::new(220.0, 44.0),
        }
    }
}

fn message(id: u64) -> StackItem {
    // Every third message comes from the other side of the conversation.
    let lane = if id % 3 == 0 { Lane::Upper } else { Lane::Lower };
    StackItem::new(id, lane, id as f64)
}

/// Evaluates at `depth`, traces the pass, and records a frame.
fn step(stack: &mut DepthStack, depth: f64, sinks: &mut Sinks, frames: &mut Vec<Value>) {
    let changes = stack.evaluate(depth);
    sinks.on_evaluate(&EvaluateEvent::from(&changes));
    if !changes.is_empty() {
        let records: Vec<ItemAttributesRecord> =
            stack.visible().map(|item| ItemAttributesRecord::from(&item)).collect();
        sinks.on_item_attributes(changes.depth, &records);
    }
    frames.push(strata_debug::json::frame(changes.depth, stack.visible()));
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut sinks = Sinks {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: RecorderSink::new(),
    };
    let mut frames = Vec::new();

    // -- engine ------------------------------------------------------------
    let mut list = ItemList::from_items((1..=MESSAGES).map(message));
    let mut stack = DepthStack::try_new(LayoutConfig::time_machine())
        .expect("time machine preset is valid");
    let geometry = StackGeometry::new(
        Rect::new(16.0, 40.0, 360.0, 320.0),
        Rect::new(16.0, 360.0, 360.0, 700.0),
    );

    if let Some(stats) = stack.prepare(&list) {
        // Exercise the Tracer wrapper once.
        let mut tracer = Tracer::new(&mut sinks);
        tracer.rebuild(&RebuildEvent::from(&stats));
    }

    // -- scroll from the oldest message to the newest ----------------------
    let max = stack.index().max_depth_position();
    let mut depth = 0.0;
    while depth < max {
        step(&mut stack, depth, &mut sinks, &mut frames);
        depth += SCROLL_STEP;
    }
    let settled = stack.settled_depth_position(depth);
    sinks.on_settle(&SettleEvent {
        near: depth,
        settled,
    });
    step(&mut stack, settled, &mut sinks, &mut frames);
    let mut previous = StackPlan::build(&stack, &geometry, &Chat);

    // -- a new message arrives while caught up -----------------------------
    list.push(message(MESSAGES + 1));
    let inserted = [ItemId(MESSAGES + 1)];
    run_batch(&mut stack, &list, &inserted, &[], &mut sinks, &mut frames);
    let plan = StackPlan::build(&stack, &geometry, &Chat);
    report_damage(&previous, &plan);
    previous = plan;

    // -- scroll back a little and delete an older message ------------------
    let back = stack.settled_depth_position(stack.depth_position() - 3.0 * SCROLL_STEP);
    step(&mut stack, back, &mut sinks, &mut frames);
    let doomed = ItemId(2);
    list.remove(doomed);
    run_batch(&mut stack, &list, &[], &[doomed], &mut sinks, &mut frames);

    // -- drag something over the live lane ---------------------------------
    let mut plan = StackPlan::build(&stack, &geometry, &Chat);
    DropZone::dim(Lane::LIVE, 0.25).apply(&mut plan);
    report_damage(&previous, &plan);

    // -- the window was resized --------------------------------------------
    let reason = InvalidationReason::BoundsChanged;
    stack.invalidate(reason);
    sinks.on_invalidate(&InvalidateEvent { reason });
    step(&mut stack, f64::NAN, &mut sinks, &mut frames);

    // -- export --------------------------------------------------------------
    let path = "strata_session.json";
    let file = File::create(path).expect("failed to create strata_session.json");
    let mut writer = BufWriter::new(file);
    strata_debug::json::export_session(sinks.recorder.as_bytes(), &frames, &mut writer)
        .expect("failed to write session JSON");

    println!("Wrote {path} ({} frames)", frames.len());
}

/// Runs one batch update through the engine with tracing.
///
/// Evaluates once at the compensated position while the batch is open, so
/// transitions can be inspected, then closes it.
fn run_batch(
    stack: &mut DepthStack,
    list: &ItemList,
    inserted: &[ItemId],
    deleted: &[ItemId],
    sinks: &mut Sinks,
    frames: &mut Vec<Value>,
) {
    let plan = stack.prepare_for_batch_update(list, inserted, deleted);
    sinks.on_batch_begin(&BatchBeginEvent::from(&plan));
    for c in stack.compensations() {
        sinks.on_compensation(&CompensationEvent::from(c));
    }
    step(stack, plan.target_depth, sinks, frames);

    for &id in inserted {
        if let Some(a) = stack.initial_attributes_for_appearing_item(id) {
            println!("  enter {} from opacity {:.2}", id.0, a.opacity);
        }
    }
    for &id in deleted {
        if let Some(a) = stack.final_attributes_for_disappearing_item(id) {
            println!("  exit {} to opacity {:.2}", id.0, a.opacity);
        }
    }

    let summary = stack.finalize_batch_update();
    sinks.on_batch_end(&BatchEndEvent::from(&summary));
}

fn report_damage(previous: &StackPlan, current: &StackPlan) {
    match DamageRegion::between(previous, current) {
        DamageRegion::Full => println!("  damage: full"),
        DamageRegion::Rects(rects) => println!("  damage: {} rects", rects.len()),
        DamageRegion::None => println!("  damage: none"),
    }
}
