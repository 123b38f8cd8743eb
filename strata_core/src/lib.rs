// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A time-ordered depth-stack layout engine.
//!
//! `strata_core` arranges time-sorted items into one or two stacks (lanes)
//! receding along a virtual depth axis, and maps a single scalar depth
//! position (derived from the host's scroll offset) to per-item scale,
//! vertical offset, and opacity. It is `no_std` compatible (with `alloc`),
//! owns no items, and renders nothing.
//!
//! # Architecture
//!
//! ```text
//!   StackSource ──► SortIndex::build() ──► ZRanges + focus positions
//!                                              │
//!          depth ─────────────┬────────────────┘
//!                             ▼
//!   DepthStack::evaluate() ──► DepthAttributeMapper ──► LayoutChanges
//!                             │
//!                             └──► FocusTracker (frontmost, focus amount)
//!
//!   prepare_for_batch_update() ──► UpdateCoordinator ──► target depth
//! ```
//!
//! **[`source`]**: Item identity, lanes, and the [`StackSource`] seam the
//! host implements.
//!
//! **[`index`]**: [`SortIndex`] holds the global time order, focus positions, and
//! per-lane [`ZRange`]s. Rebuilt only on invalidation.
//!
//! **[`mapper`]**: [`DepthAttributeMapper`], a pure mapping from depth to
//! [`ItemAttributes`] through the configured keypoint curves.
//!
//! **[`focus`]**: [`FocusTracker`] finds the frontmost item per lane, focus amount,
//! and the globally focused item.
//!
//! **[`update`]**: [`UpdateCoordinator`] owns scroll compensation, auto-scroll,
//! and enter/exit bookkeeping for insert/delete batches.
//!
//! **[`stack`]**: [`DepthStack`], the engine tying the above together with a
//! per-rank attribute cache.
//!
//! **[`dirty`]**: Dirty-tracking channels via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! layout instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use strata_core::{DepthStack, ItemId, ItemList, Lane, LayoutConfig, StackItem};
//!
//! let list = ItemList::from_items([
//!     StackItem::new(1, Lane::Lower, 10.0),
//!     StackItem::new(2, Lane::Lower, 20.0),
//!     StackItem::new(3, Lane::Lower, 30.0),
//! ]);
//! let mut stack = DepthStack::new(LayoutConfig::time_machine());
//! stack.prepare(&list);
//!
//! let changes = stack.evaluate(100.0);
//! assert_eq!(changes.shown.len(), 3);
//! assert_eq!(stack.frontmost_item(Lane::Lower), Some(ItemId(2)));
//! assert!(stack.attributes(ItemId(2), 100.0).unwrap().is_identity());
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-item
//!   attribute events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod curve;
pub mod dirty;
pub mod focus;
pub mod index;
pub mod mapper;
pub mod source;
pub mod stack;
pub mod trace;
pub mod update;

pub use config::{ConfigError, LayoutConfig};
pub use curve::Keypoints;
pub use focus::FocusTracker;
pub use index::{SortIndex, ZRange};
pub use mapper::{DepthAttributeMapper, ItemAttributes};
pub use source::{ItemId, ItemList, Lane, StackItem, StackSource};
pub use stack::{BatchPlan, DepthStack, InvalidationReason, LayoutChanges, RebuildStats, VisibleItem};
pub use update::{BatchSummary, ItemTransition, UpdateCoordinator};
