// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The depth-stack engine.
//!
//! [`DepthStack`] owns the derived caches for one stack view: the
//! [`SortIndex`], a per-rank attribute cache, dirty tracking for the next
//! [`evaluate`](DepthStack::evaluate) pass, and the batch
//! [`UpdateCoordinator`]. It never owns items; every rebuild reads them from
//! a [`StackSource`].
//!
//! # Caching contract
//!
//! Geometry is rebuilt only by [`prepare`](DepthStack::prepare) (after an
//! [`invalidate`](DepthStack::invalidate)) or by
//! [`prepare_for_batch_update`](DepthStack::prepare_for_batch_update).
//! Queries never rebuild. Until the host prepares, queries answer from the
//! previous geometry, and ids the previous geometry does not know return
//! `None`.

mod batch;
mod evaluate;

pub use batch::BatchPlan;
pub use evaluate::{LayoutChanges, VisibleItem};

use alloc::vec;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::config::{ConfigError, LayoutConfig};
use crate::focus::FocusTracker;
use crate::index::{SortIndex, ZRange};
use crate::mapper::{DepthAttributeMapper, ItemAttributes};
use crate::source::{ItemId, Lane, StackSource};
use crate::update::UpdateCoordinator;

/// Why the host is invalidating the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationReason {
    /// Items were added, removed, moved between lanes, or re-keyed. The next
    /// [`prepare`](DepthStack::prepare) rebuilds the sort index.
    ItemSetChanged,
    /// The view's size changed. Only the attribute cache is dropped; the next
    /// [`evaluate`](DepthStack::evaluate) reports every visible item as
    /// updated.
    BoundsChanged,
}

/// Statistics from one sort-index rebuild.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RebuildStats {
    /// Items indexed.
    pub item_count: usize,
    /// Items per lane, indexed by [`Lane::index`].
    pub lane_counts: [usize; 2],
    /// Items that sorted last for lack of a usable sort value.
    pub unresolved: usize,
    /// `item_count * item_depth`.
    pub extent: f64,
}

impl RebuildStats {
    fn of(index: &SortIndex) -> Self {
        Self {
            item_count: index.len(),
            lane_counts: Lane::ALL.map(|lane| index.lane_len(lane)),
            unresolved: index.unresolved_count(),
            extent: index.extent(),
        }
    }
}

/// A time-ordered depth-stack layout engine.
#[derive(Debug)]
pub struct DepthStack {
    config: LayoutConfig,
    mapper: DepthAttributeMapper,

    // -- Geometry --
    index: SortIndex,
    rebuild_pending: bool,

    // -- Attribute cache (indexed by rank) --
    attributes: Vec<Option<ItemAttributes>>,
    visible: Vec<u32>,
    depth: f64,

    // -- Evaluation state --
    dirty: DirtyTracker<u32>,
    full_pass: bool,
    cache_stale: bool,
    topology_dirty: bool,
    pending_hidden: Vec<ItemId>,

    // -- Batch updates --
    coordinator: UpdateCoordinator,
}

impl DepthStack {
    /// Creates an empty engine.
    ///
    /// `config` should pass [`LayoutConfig::validate`]; this is only checked
    /// in debug builds. Use [`try_new`](Self::try_new) for untrusted input.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid layout config: {config:?}"
        );
        Self {
            config,
            mapper: DepthAttributeMapper::new(config),
            index: SortIndex::empty(config.item_depth),
            rebuild_pending: true,
            attributes: Vec::new(),
            visible: Vec::new(),
            depth: 0.0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            full_pass: true,
            cache_stale: false,
            topology_dirty: false,
            pending_hidden: Vec::new(),
            coordinator: UpdateCoordinator::new(),
        }
    }

    /// Creates an empty engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first problem [`LayoutConfig::validate`] finds.
    pub fn try_new(config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Engine configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The current sort index.
    #[inline]
    #[must_use]
    pub fn index(&self) -> &SortIndex {
        &self.index
    }

    /// Depth position of the last [`evaluate`](Self::evaluate), or the
    /// compensated position after
    /// [`prepare_for_batch_update`](Self::prepare_for_batch_update).
    #[inline]
    #[must_use]
    pub fn depth_position(&self) -> f64 {
        self.depth
    }

    // -- Invalidation --

    /// Marks cached state stale. Nothing is recomputed until
    /// [`prepare`](Self::prepare) or [`evaluate`](Self::evaluate).
    pub fn invalidate(&mut self, reason: InvalidationReason) {
        match reason {
            InvalidationReason::ItemSetChanged => self.rebuild_pending = true,
            InvalidationReason::BoundsChanged => {
                self.cache_stale = true;
                self.full_pass = true;
            }
        }
    }

    /// Returns `true` if the next [`prepare`](Self::prepare) will rebuild.
    #[inline]
    #[must_use]
    pub fn needs_rebuild(&self) -> bool {
        self.rebuild_pending
    }

    /// Rebuilds the sort index from `source` if it was invalidated.
    ///
    /// Returns the rebuild statistics, or `None` if the index was current.
    pub fn prepare<S: StackSource + ?Sized>(&mut self, source: &S) -> Option<RebuildStats> {
        if !self.rebuild_pending {
            return None;
        }
        let index = SortIndex::build(source, self.config.item_depth);
        self.install_index(index);
        Some(RebuildStats::of(&self.index))
    }

    /// Replaces the sort index, carrying cached attributes of surviving
    /// visible items over to their new ranks. Returns the old index.
    fn install_index(&mut self, index: SortIndex) -> SortIndex {
        let old = core::mem::replace(&mut self.index, index);
        let mut attributes = vec![None; self.index.len()];
        let mut visible = Vec::with_capacity(self.visible.len());
        for &rank in &self.visible {
            let id = old.id_at(rank as usize);
            match self.index.rank_of(id) {
                Some(new_rank) => {
                    attributes[new_rank] = self.attributes[rank as usize];
                    visible.push(crate::index::to_slot(new_rank));
                }
                None => self.pending_hidden.push(id),
            }
        }
        visible.sort_unstable();
        self.attributes = attributes;
        self.visible = visible;
        self.dirty = DirtyTracker::with_cycle_handling(CycleHandling::Error);
        self.rebuild_pending = false;
        self.topology_dirty = true;
        self.full_pass = true;
        old
    }

    // -- Per-item queries --

    /// Z-range of `id`.
    #[must_use]
    pub fn z_range(&self, id: ItemId) -> Option<ZRange> {
        self.index.z_range(id)
    }

    /// Focus position of `id`.
    #[must_use]
    pub fn focus_position(&self, id: ItemId) -> Option<f64> {
        self.index.focus_position(id)
    }

    /// Global rank of `id`.
    #[must_use]
    pub fn rank(&self, id: ItemId) -> Option<usize> {
        self.index.rank_of(id)
    }

    /// Attributes of `id` at `depth`, or `None` if the item is unknown or
    /// culled.
    ///
    /// This is a pure computation over the cached geometry and does not touch
    /// the attribute cache.
    #[must_use]
    pub fn attributes(&self, id: ItemId, depth: f64) -> Option<ItemAttributes> {
        let rank = self.index.rank_of(id)?;
        let lane = self.index.lane_at(rank);
        let frontmost = self.focus().frontmost_rank(lane, depth)?;
        self.mapper.attributes(&self.index, frontmost, rank, depth)
    }

    /// Cached attributes of the item at `rank` from the last
    /// [`evaluate`](Self::evaluate), or `None` if it is not visible.
    #[must_use]
    pub fn attributes_at(&self, rank: usize) -> Option<ItemAttributes> {
        self.attributes.get(rank).copied().flatten()
    }

    // -- Focus queries (at the current depth position) --

    fn focus(&self) -> FocusTracker<'_> {
        FocusTracker::new(&self.index)
    }

    /// Frontmost item of `lane`.
    #[must_use]
    pub fn frontmost_item(&self, lane: Lane) -> Option<ItemId> {
        self.focus().frontmost_item(lane, self.depth)
    }

    /// Focus amount of `lane`, in `[0, 1]`.
    #[must_use]
    pub fn focus_amount(&self, lane: Lane) -> f64 {
        self.focus().focus_amount(lane, self.depth)
    }

    /// The globally focused item.
    #[must_use]
    pub fn focused_item(&self) -> Option<ItemId> {
        self.focus().focused_item(self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ItemList, StackItem};

    fn lower(id: u64, value: f64) -> StackItem {
        StackItem::new(id, Lane::Lower, value)
    }

    fn stack_with(list: &ItemList) -> DepthStack {
        let mut stack = DepthStack::new(LayoutConfig::time_machine());
        stack.prepare(list);
        stack
    }

    #[test]
    fn try_new_rejects_invalid_config() {
        let config = LayoutConfig::time_machine().with_stack_depth(0);
        assert_eq!(DepthStack::try_new(config).err(), Some(ConfigError::StackDepth));
        assert!(DepthStack::try_new(LayoutConfig::flat()).is_ok());
    }

    #[test]
    fn prepare_rebuilds_only_when_invalidated() {
        let list = ItemList::from_items([lower(1, 1.0), lower(2, 2.0)]);
        let mut stack = DepthStack::new(LayoutConfig::time_machine());
        assert!(stack.needs_rebuild());
        let stats = stack.prepare(&list).unwrap();
        assert_eq!(stats.item_count, 2);
        assert_eq!(stats.lane_counts, [0, 2]);
        assert_eq!(stats.extent, 200.0);
        assert!(stack.prepare(&list).is_none());

        stack.invalidate(InvalidationReason::BoundsChanged);
        assert!(stack.prepare(&list).is_none());

        stack.invalidate(InvalidationReason::ItemSetChanged);
        assert!(stack.prepare(&list).is_some());
    }

    #[test]
    fn queries_use_stale_geometry_until_prepared() {
        let mut list = ItemList::from_items([lower(1, 1.0), lower(2, 2.0)]);
        let mut stack = stack_with(&list);
        list.push(lower(3, 3.0));
        stack.invalidate(InvalidationReason::ItemSetChanged);
        assert_eq!(stack.rank(ItemId(3)), None);
        assert_eq!(stack.attributes(ItemId(3), 0.0), None);
        assert!(stack.attributes(ItemId(2), 0.0).is_some());
        stack.prepare(&list);
        assert_eq!(stack.rank(ItemId(3)), Some(2));
    }

    #[test]
    fn attributes_of_unknown_item_are_none() {
        let list = ItemList::from_items([lower(1, 1.0)]);
        let stack = stack_with(&list);
        assert_eq!(stack.attributes(ItemId(42), 0.0), None);
    }

    #[test]
    fn attributes_are_culled_far_from_frontmost() {
        let list = ItemList::from_items((0..10).map(|i| lower(i, i as f64)));
        let stack = stack_with(&list);
        assert!(stack.attributes(ItemId(4), 0.0).is_some());
        assert_eq!(stack.attributes(ItemId(5), 0.0), None);
    }

    #[test]
    fn focus_queries_follow_depth_position() {
        let list = ItemList::from_items([lower(10, 10.0), lower(20, 20.0), lower(30, 30.0)]);
        let mut stack = stack_with(&list);
        assert_eq!(stack.frontmost_item(Lane::Lower), Some(ItemId(10)));
        let _ = stack.evaluate(150.0);
        assert_eq!(stack.frontmost_item(Lane::Lower), Some(ItemId(20)));
        assert_eq!(stack.focused_item(), Some(ItemId(20)));
        assert!((stack.focus_amount(Lane::Lower) - 1.0).abs() < 1e-9);
        assert_eq!(stack.frontmost_item(Lane::Upper), None);
    }
}
