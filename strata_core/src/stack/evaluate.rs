// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout evaluation and change tracking.
//!
//! Each [`DepthStack::evaluate`] call with a new depth position (or after an
//! invalidation) runs one pass:
//!
//! 1. Mark every rank visible after the previous pass on
//!    [`VISIBILITY`](crate::dirty::VISIBILITY).
//! 2. Walk each lane outward from its frontmost item until the cull distance
//!    and mark those ranks on [`ATTRIBUTES`](crate::dirty::ATTRIBUTES).
//! 3. Drain **ATTRIBUTES**, recompute and cache attributes, and report ranks
//!    as shown or updated.
//! 4. Drain **VISIBILITY** and hide the ranks that were not recomputed.
//!
//! A pass touches `O(stack_depth)` ranks per lane regardless of item count.
//! Calling `evaluate` again at the same depth with nothing invalidated does no
//! work and reports no changes.

use alloc::vec::Vec;

use super::DepthStack;
use crate::dirty;
use crate::mapper::ItemAttributes;
use crate::source::{ItemId, Lane};

/// The set of changes produced by a single [`DepthStack::evaluate`] call.
///
/// `updated` and `shown` hold global ranks so hosts can read attributes via
/// [`DepthStack::attributes_at`] without a map lookup. `hidden` holds ids
/// because a hidden item's rank may no longer exist after a rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutChanges {
    /// Depth position the pass was evaluated at.
    pub depth: f64,
    /// Ranks that stayed visible but whose attributes changed.
    pub updated: Vec<u32>,
    /// Ranks that became visible.
    pub shown: Vec<u32>,
    /// Items that are no longer visible (culled or removed).
    pub hidden: Vec<ItemId>,
    /// Whether the sort index was rebuilt since the previous pass.
    pub topology_changed: bool,
}

impl LayoutChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.depth = 0.0;
        self.updated.clear();
        self.shown.clear();
        self.hidden.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
            && self.shown.is_empty()
            && self.hidden.is_empty()
            && !self.topology_changed
    }
}

/// One visible item with its cached attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleItem {
    /// Item identifier.
    pub id: ItemId,
    /// Global rank.
    pub rank: usize,
    /// Lane the item is shown in.
    pub lane: Lane,
    /// Attributes from the last pass.
    pub attributes: ItemAttributes,
}

impl DepthStack {
    /// Evaluates the layout at `depth` and returns what changed.
    ///
    /// A NaN `depth` keeps the current depth position.
    pub fn evaluate(&mut self, depth: f64) -> LayoutChanges {
        let mut changes = LayoutChanges::default();
        self.evaluate_into(depth, &mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, depth: f64, changes: &mut LayoutChanges) {
        changes.clear();
        let depth = if depth.is_nan() { self.depth } else { depth };
        changes.depth = depth;
        changes.topology_changed = core::mem::take(&mut self.topology_dirty);

        let pass = self.full_pass || depth != self.depth;
        self.depth = depth;
        if pass {
            self.run_pass(depth, changes);
            self.full_pass = false;
            self.cache_stale = false;
        }

        core::mem::swap(&mut self.pending_hidden, &mut changes.hidden);
        changes.hidden.extend(self.pending_hidden.drain(..));
    }

    fn run_pass(&mut self, depth: f64, changes: &mut LayoutChanges) {
        for &rank in &self.visible {
            self.dirty.mark(rank, dirty::VISIBILITY);
        }
        let mut window = Vec::new();
        self.collect_window(depth, &mut window);
        for &rank in &window {
            self.dirty.mark(rank, dirty::ATTRIBUTES);
        }

        let frontmost = Lane::ALL.map(|lane| self.focus().frontmost_rank(lane, depth));

        let mut recomputed: Vec<u32> = self
            .dirty
            .drain(dirty::ATTRIBUTES)
            .deterministic()
            .run()
            .collect();
        recomputed.sort_unstable();
        for &rank in &recomputed {
            let r = rank as usize;
            let lane = self.index.lane_at(r);
            let next = frontmost[lane.index()]
                .and_then(|front| self.mapper.attributes(&self.index, front, r, depth));
            match (self.attributes[r], next) {
                (None, Some(_)) => changes.shown.push(rank),
                (Some(prev), Some(next)) if self.cache_stale || prev != next => {
                    changes.updated.push(rank);
                }
                _ => {}
            }
            self.attributes[r] = next;
        }

        let mut previously_visible: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .deterministic()
            .run()
            .collect();
        previously_visible.sort_unstable();
        for rank in previously_visible {
            if recomputed.binary_search(&rank).is_ok() {
                continue;
            }
            if self.attributes[rank as usize].take().is_some() {
                changes.hidden.push(self.index.id_at(rank as usize));
            }
        }

        self.visible = recomputed;
    }

    /// Collects the ranks within the cull distance of each lane's frontmost
    /// item at `depth`.
    fn collect_window(&self, depth: f64, out: &mut Vec<u32>) {
        for lane in Lane::ALL {
            let Some(cursor) = self.index.lane_cursor(lane, depth) else {
                continue;
            };
            let ranks = self.index.lane_ranks(lane);
            let front = ranks[cursor] as usize;
            for &rank in ranks[..cursor].iter().rev() {
                if self.mapper.is_culled(front, rank as usize) {
                    break;
                }
                out.push(rank);
            }
            for &rank in &ranks[cursor..] {
                if self.mapper.is_culled(front, rank as usize) {
                    break;
                }
                out.push(rank);
            }
        }
    }

    /// Ranks visible after the last pass, ascending.
    #[must_use]
    pub fn visible_ranks(&self) -> &[u32] {
        &self.visible
    }

    /// Every visible item from the last pass, back to front (newest first).
    pub fn visible(&self) -> impl Iterator<Item = VisibleItem> + '_ {
        self.visible.iter().rev().filter_map(|&rank| {
            let rank = rank as usize;
            let attributes = self.attributes[rank]?;
            Some(VisibleItem {
                id: self.index.id_at(rank),
                rank,
                lane: self.index.lane_at(rank),
                attributes,
            })
        })
    }

    /// Visible items of `lane` from the last pass, back to front.
    #[must_use]
    pub fn visible_items(&self, lane: Lane) -> Vec<VisibleItem> {
        self.visible().filter(|item| item.lane == lane).collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::source::{ItemList, StackItem};
    use crate::stack::InvalidationReason;

    fn lower(id: u64, value: f64) -> StackItem {
        StackItem::new(id, Lane::Lower, value)
    }

    fn stack_of(n: u64) -> (ItemList, DepthStack) {
        let list = ItemList::from_items((0..n).map(|i| lower(i, i as f64)));
        let mut stack = DepthStack::new(LayoutConfig::time_machine());
        stack.prepare(&list);
        (list, stack)
    }

    #[test]
    fn first_evaluate_shows_window() {
        let (_, mut stack) = stack_of(10);
        let changes = stack.evaluate(0.0);
        assert!(changes.topology_changed);
        // Frontmost rank 0 plus four ranks behind it.
        assert_eq!(changes.shown, vec![0, 1, 2, 3, 4]);
        assert!(changes.updated.is_empty());
        assert!(changes.hidden.is_empty());
        assert_eq!(stack.visible_ranks(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn same_depth_is_a_no_op() {
        let (_, mut stack) = stack_of(10);
        let _ = stack.evaluate(0.0);
        let changes = stack.evaluate(0.0);
        assert!(changes.is_empty(), "{changes:?}");
    }

    #[test]
    fn scrolling_shows_and_hides_at_the_window_edges() {
        let (_, mut stack) = stack_of(10);
        let _ = stack.evaluate(0.0);
        let changes = stack.evaluate(100.0);
        assert_eq!(changes.shown, vec![5]);
        assert_eq!(changes.updated, vec![0, 1, 2, 3, 4]);
        assert!(changes.hidden.is_empty());

        let changes = stack.evaluate(600.0);
        // Window is now ranks 2..=10 clamped to 9.
        assert_eq!(changes.shown, vec![6, 7, 8, 9]);
        assert_eq!(changes.hidden, vec![ItemId(0), ItemId(1)]);
    }

    #[test]
    fn bounds_change_reports_every_visible_rank() {
        let (_, mut stack) = stack_of(3);
        let _ = stack.evaluate(100.0);
        stack.invalidate(InvalidationReason::BoundsChanged);
        let changes = stack.evaluate(100.0);
        assert_eq!(changes.updated, vec![0, 1, 2]);
        assert!(changes.shown.is_empty());
        assert!(stack.evaluate(100.0).is_empty());
    }

    #[test]
    fn rebuild_hides_removed_items_and_keeps_survivors() {
        let (mut list, mut stack) = stack_of(3);
        let _ = stack.evaluate(0.0);
        list.remove(ItemId(1));
        stack.invalidate(InvalidationReason::ItemSetChanged);
        stack.prepare(&list);
        let changes = stack.evaluate(0.0);
        assert!(changes.topology_changed);
        assert_eq!(changes.hidden, vec![ItemId(1)]);
        assert!(changes.shown.is_empty());
        // Item 2 moved from rank 2 to rank 1, so its attributes changed.
        assert_eq!(changes.updated, vec![1]);
    }

    #[test]
    fn visible_items_are_back_to_front() {
        let (_, mut stack) = stack_of(4);
        let _ = stack.evaluate(150.0);
        let ids: Vec<_> = stack.visible_items(Lane::Lower).iter().map(|v| v.id).collect();
        assert_eq!(ids, [ItemId(3), ItemId(2), ItemId(1), ItemId(0)]);
        assert!(stack.visible_items(Lane::Upper).is_empty());
        let front = stack.visible_items(Lane::Lower)[2];
        assert!((front.attributes.opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nan_depth_keeps_position() {
        let (_, mut stack) = stack_of(3);
        let _ = stack.evaluate(100.0);
        let changes = stack.evaluate(f64::NAN);
        assert_eq!(changes.depth, 100.0);
        assert!(changes.is_empty());
    }
}
