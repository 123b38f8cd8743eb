// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the layout engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! host instrumentation calls around engine operations. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! Events are built from engine return values ([`RebuildStats`],
//! [`LayoutChanges`], [`BatchPlan`], [`Compensation`], [`BatchSummary`]) via
//! `From` impls, so the engine itself stays free of instrumentation.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`ItemAttributesRecord`] events
//!   plus the corresponding `TraceSink` method.

use crate::source::ItemId;
use crate::stack::{BatchPlan, InvalidationReason, LayoutChanges, RebuildStats};
use crate::update::{BatchSummary, ChangeKind, Compensation};

#[cfg(feature = "trace-rich")]
use crate::mapper::ItemAttributes;
#[cfg(feature = "trace-rich")]
use crate::source::Lane;
#[cfg(feature = "trace-rich")]
use crate::stack::VisibleItem;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the host invalidates the engine.
#[derive(Clone, Copy, Debug)]
pub struct InvalidateEvent {
    /// Why the engine was invalidated.
    pub reason: InvalidationReason,
}

/// Emitted after the sort index is rebuilt.
#[derive(Clone, Copy, Debug)]
pub struct RebuildEvent {
    /// Items indexed.
    pub item_count: usize,
    /// Items in the upper lane.
    pub upper: usize,
    /// Items in the lower lane.
    pub lower: usize,
    /// Items without a usable sort value.
    pub unresolved: usize,
    /// Global extent of the depth axis.
    pub extent: f64,
}

impl From<&RebuildStats> for RebuildEvent {
    fn from(stats: &RebuildStats) -> Self {
        Self {
            item_count: stats.item_count,
            upper: stats.lane_counts[0],
            lower: stats.lane_counts[1],
            unresolved: stats.unresolved,
            extent: stats.extent,
        }
    }
}

/// Emitted after an evaluation pass.
#[derive(Clone, Copy, Debug)]
pub struct EvaluateEvent {
    /// Depth position evaluated.
    pub depth: f64,
    /// Ranks whose attributes changed.
    pub updated: usize,
    /// Ranks that became visible.
    pub shown: usize,
    /// Items that stopped being visible.
    pub hidden: usize,
    /// Whether the index was rebuilt since the previous pass.
    pub topology_changed: bool,
}

impl From<&LayoutChanges> for EvaluateEvent {
    fn from(changes: &LayoutChanges) -> Self {
        Self {
            depth: changes.depth,
            updated: changes.updated.len(),
            shown: changes.shown.len(),
            hidden: changes.hidden.len(),
            topology_changed: changes.topology_changed,
        }
    }
}

/// Emitted when a batch update opens.
#[derive(Clone, Copy, Debug)]
pub struct BatchBeginEvent {
    /// Depth position before the batch.
    pub depth_before: f64,
    /// Item focused before the batch.
    pub anchor: Option<ItemId>,
    /// Genuine inserts.
    pub inserted: usize,
    /// Genuine deletes.
    pub deleted: usize,
    /// Depth position after compensation.
    pub target_depth: f64,
    /// Whether the view jumps to the newest item.
    pub auto_scroll: bool,
}

impl From<&BatchPlan> for BatchBeginEvent {
    fn from(plan: &BatchPlan) -> Self {
        Self {
            depth_before: plan.depth_before,
            anchor: plan.anchor,
            inserted: plan.inserted,
            deleted: plan.deleted,
            target_depth: plan.target_depth,
            auto_scroll: plan.auto_scroll,
        }
    }
}

/// Emitted for each scroll compensation inside a batch.
#[derive(Clone, Copy, Debug)]
pub struct CompensationEvent {
    /// The inserted or deleted item.
    pub item: ItemId,
    /// Insert or delete.
    pub kind: ChangeKind,
    /// Signed depth contribution.
    pub delta: f64,
}

impl From<&Compensation> for CompensationEvent {
    fn from(c: &Compensation) -> Self {
        Self {
            item: c.item,
            kind: c.kind,
            delta: c.delta,
        }
    }
}

/// Emitted when a batch update closes.
#[derive(Clone, Copy, Debug)]
pub struct BatchEndEvent {
    /// Genuine inserts.
    pub inserted: usize,
    /// Genuine deletes.
    pub deleted: usize,
    /// Previously visible items whose rank changed.
    pub moved: usize,
    /// Total scroll compensation.
    pub scroll_delta: f64,
    /// Whether auto-scroll was pending.
    pub auto_scroll: bool,
}

impl From<&BatchSummary> for BatchEndEvent {
    fn from(summary: &BatchSummary) -> Self {
        Self {
            inserted: summary.inserted,
            deleted: summary.deleted,
            moved: summary.moved,
            scroll_delta: summary.scroll_delta,
            auto_scroll: summary.auto_scroll,
        }
    }
}

/// Emitted when motion stops and the depth position settles on a slot.
#[derive(Clone, Copy, Debug)]
pub struct SettleEvent {
    /// Resting position before snapping.
    pub near: f64,
    /// Snapped position.
    pub settled: f64,
}

/// Attributes of one visible item.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ItemAttributesRecord {
    /// Item identifier.
    pub item: ItemId,
    /// Lane the item is shown in.
    pub lane: Lane,
    /// Computed attributes.
    pub attributes: ItemAttributes,
}

#[cfg(feature = "trace-rich")]
impl From<&VisibleItem> for ItemAttributesRecord {
    fn from(item: &VisibleItem) -> Self {
        Self {
            item: item.id,
            lane: item.lane,
            attributes: item.attributes,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from layout instrumentation.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the engine is invalidated.
    fn on_invalidate(&mut self, e: &InvalidateEvent) {
        _ = e;
    }

    /// Called after a sort-index rebuild.
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        _ = e;
    }

    /// Called after an evaluation pass.
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        _ = e;
    }

    /// Called when a batch opens.
    fn on_batch_begin(&mut self, e: &BatchBeginEvent) {
        _ = e;
    }

    /// Called for each scroll compensation of a batch.
    fn on_compensation(&mut self, e: &CompensationEvent) {
        _ = e;
    }

    /// Called when a batch closes.
    fn on_batch_end(&mut self, e: &BatchEndEvent) {
        _ = e;
    }

    /// Called when the depth position settles.
    fn on_settle(&mut self, e: &SettleEvent) {
        _ = e;
    }

    /// Called with the visible items after a pass (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_item_attributes(&mut self, depth: f64, items: &[ItemAttributesRecord]) {
        _ = (depth, items);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Generates a `Tracer` method that forwards one event to the sink.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident => $hook:ident($event:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward!(
        /// Emits an [`InvalidateEvent`].
        invalidate => on_invalidate(InvalidateEvent)
    );
    forward!(
        /// Emits a [`RebuildEvent`].
        rebuild => on_rebuild(RebuildEvent)
    );
    forward!(
        /// Emits an [`EvaluateEvent`].
        evaluate => on_evaluate(EvaluateEvent)
    );
    forward!(
        /// Emits a [`BatchBeginEvent`].
        batch_begin => on_batch_begin(BatchBeginEvent)
    );
    forward!(
        /// Emits a [`CompensationEvent`].
        compensation => on_compensation(CompensationEvent)
    );
    forward!(
        /// Emits a [`BatchEndEvent`].
        batch_end => on_batch_end(BatchEndEvent)
    );
    forward!(
        /// Emits a [`SettleEvent`].
        settle => on_settle(SettleEvent)
    );

    /// Emits visible-item attributes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn item_attributes(&mut self, depth: f64, items: &[ItemAttributesRecord]) {
        if let Some(s) = &mut self.sink {
            s.on_item_attributes(depth, items);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
