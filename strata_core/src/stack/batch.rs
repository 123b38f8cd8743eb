// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch updates, transitions, and settling.
//!
//! A batch is bracketed by
//! [`prepare_for_batch_update`](DepthStack::prepare_for_batch_update) and
//! [`finalize_batch_update`](DepthStack::finalize_batch_update). In between,
//! the engine already answers from the new geometry, and the host can ask how
//! each item should animate from its pre-batch state.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use super::DepthStack;
use crate::index::SortIndex;
use crate::mapper::ItemAttributes;
use crate::source::{ItemId, Lane, StackSource};
use crate::update::{BatchSummary, Compensation, ItemTransition};

/// What [`DepthStack::prepare_for_batch_update`] decided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchPlan {
    /// Depth position before the batch.
    pub depth_before: f64,
    /// Item focused before the batch.
    pub anchor: Option<ItemId>,
    /// Genuine inserts.
    pub inserted: usize,
    /// Genuine deletes.
    pub deleted: usize,
    /// Scroll compensation for changes before the anchor.
    pub scroll_delta: f64,
    /// Whether the view should jump to the newest item.
    pub auto_scroll: bool,
    /// Compensated depth position the engine moved to.
    pub target_depth: f64,
}

impl DepthStack {
    /// Opens a batch: snapshots what is visible, rebuilds the sort index from
    /// `source` (which must already reflect the changes), and computes the
    /// compensated depth position.
    ///
    /// The engine's depth position moves to the target immediately, so the
    /// next [`evaluate`](Self::evaluate) at
    /// [`depth_position`](Self::depth_position) keeps the focused item where
    /// it was. Opening a batch while one is open discards the old one.
    pub fn prepare_for_batch_update<S: StackSource + ?Sized>(
        &mut self,
        source: &S,
        inserted: &[ItemId],
        deleted: &[ItemId],
    ) -> BatchPlan {
        let depth_before = self.depth;
        let anchor = self.focused_item();
        let visible_before: Vec<_> =
            self.visible().map(|item| (item.id, item.lane, item.attributes)).collect();
        self.coordinator.begin(depth_before, anchor, visible_before);

        let after = SortIndex::build(source, self.config.item_depth);
        let before = self.install_index(after);
        self.coordinator
            .record_changes(&before, &self.index, inserted, deleted);

        let target_depth = self.target_depth_position(depth_before);
        self.depth = target_depth;
        BatchPlan {
            depth_before,
            anchor,
            inserted: self.coordinator.inserted().count(),
            deleted: self.coordinator.deleted().count(),
            scroll_delta: self.coordinator.scroll_delta(),
            auto_scroll: self.coordinator.auto_scroll(),
            target_depth,
        }
    }

    /// Returns `true` while a batch is open.
    #[must_use]
    pub fn is_batch_active(&self) -> bool {
        self.coordinator.is_active()
    }

    /// Where the host should scroll after the batch, given the position it
    /// would otherwise use.
    ///
    /// Outside a batch this only clamps `proposed` into the valid range.
    #[must_use]
    pub fn target_depth_position(&self, proposed: f64) -> f64 {
        self.coordinator.target_depth_position(proposed, &self.index)
    }

    /// Individual scroll compensations of the open batch.
    #[must_use]
    pub fn compensations(&self) -> &[Compensation] {
        self.coordinator.compensations()
    }

    /// Genuinely inserted items of the open batch, in id order.
    pub fn inserted_in_batch(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.coordinator.inserted()
    }

    /// Genuinely deleted items of the open batch, in id order.
    pub fn deleted_in_batch(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.coordinator.deleted()
    }

    /// Lane a deleted or surviving item was shown in before the batch, if it
    /// was visible then.
    #[must_use]
    pub fn lane_before_batch(&self, id: ItemId) -> Option<Lane> {
        self.coordinator.lane_before(id)
    }

    /// How `id` should animate across the open batch, if at all.
    #[must_use]
    pub fn transition(&self, id: ItemId) -> Option<ItemTransition> {
        self.coordinator.transition(id)
    }

    /// Starting attributes for an item entering the layout.
    ///
    /// Inserted items start at their new attributes, fully transparent.
    /// Surviving items that were visible start from their pre-batch
    /// attributes. Anything else has no special starting state.
    #[must_use]
    pub fn initial_attributes_for_appearing_item(&self, id: ItemId) -> Option<ItemAttributes> {
        match self.transition(id)? {
            ItemTransition::Appear => self.attributes(id, self.depth).map(|a| a.with_opacity(0.0)),
            ItemTransition::Reposition => self.coordinator.attributes_before(id),
            ItemTransition::Disappear => None,
        }
    }

    /// Ending attributes for an item leaving the layout.
    ///
    /// Deleted items fade out from where they were. Surviving items end at
    /// their new attributes, or fade out in place if they are now culled.
    #[must_use]
    pub fn final_attributes_for_disappearing_item(&self, id: ItemId) -> Option<ItemAttributes> {
        let faded = || {
            self.coordinator
                .attributes_before(id)
                .map(|a| a.with_opacity(0.0))
        };
        match self.transition(id)? {
            ItemTransition::Disappear => faded(),
            ItemTransition::Reposition => self.attributes(id, self.depth).or_else(faded),
            ItemTransition::Appear => None,
        }
    }

    /// Closes the batch and clears all per-batch bookkeeping.
    pub fn finalize_batch_update(&mut self) -> BatchSummary {
        self.coordinator.finish()
    }

    /// Snaps a resting depth position to the nearest slot, clamped into the
    /// valid range.
    #[must_use]
    pub fn settled_depth_position(&self, near: f64) -> f64 {
        if !near.is_finite() {
            return self.index.clamp_depth(near);
        }
        let item_depth = self.config.item_depth;
        self.index
            .clamp_depth((near / item_depth).round() * item_depth)
    }
}
