// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch update bookkeeping.
//!
//! An [`UpdateCoordinator`] lives for the whole engine but only holds state
//! between [`begin`](UpdateCoordinator::begin) and
//! [`finish`](UpdateCoordinator::finish). While a batch is open it knows:
//!
//! - which item was globally focused before the batch (the *anchor*);
//! - which items were visible before the batch, with their attributes;
//! - which inserts and deletes are genuine (the id appears on one side of
//!   the batch only);
//! - the scroll delta that keeps the anchor where it was, and whether the
//!   view should jump to the newest item instead.
//!
//! Items that survive the batch are never treated as appearing or
//! disappearing, even if their rank changed.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::index::SortIndex;
use crate::mapper::ItemAttributes;
use crate::source::{ItemId, Lane};

/// Whether a compensation came from an insert or a delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A genuinely new item.
    Insert,
    /// A genuinely removed item.
    Delete,
}

/// One scroll adjustment contributed by a change before the anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compensation {
    /// The inserted or deleted item.
    pub item: ItemId,
    /// Which kind of change it was.
    pub kind: ChangeKind,
    /// `+item_depth` for inserts, `-item_depth` for deletes.
    pub delta: f64,
}

/// How an item should animate across a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemTransition {
    /// Newly inserted: enter animation.
    Appear,
    /// Removed: exit animation.
    Disappear,
    /// Visible before and still present: continuous move from its pre-batch
    /// attributes.
    Reposition,
}

/// Result of closing a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatchSummary {
    /// Genuine inserts.
    pub inserted: usize,
    /// Genuine deletes.
    pub deleted: usize,
    /// Previously visible items whose rank changed.
    pub moved: usize,
    /// Accumulated scroll compensation.
    pub scroll_delta: f64,
    /// Whether auto-scroll to the newest item was pending.
    pub auto_scroll: bool,
}

/// Tracks one insert/delete batch at a time.
#[derive(Clone, Debug, Default)]
pub struct UpdateCoordinator {
    active: bool,
    depth_before: f64,
    anchor: Option<ItemId>,
    visible_before: BTreeMap<ItemId, (Lane, ItemAttributes)>,
    inserted: BTreeSet<ItemId>,
    deleted: BTreeSet<ItemId>,
    compensations: Vec<Compensation>,
    scroll_delta: f64,
    auto_scroll: bool,
    moved: usize,
}

impl UpdateCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` between [`begin`](Self::begin) and
    /// [`finish`](Self::finish).
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Opens a batch, discarding any batch that was never finished.
    ///
    /// `depth` is the depth position before the batch and `anchor` the item
    /// focused there.
    pub fn begin(
        &mut self,
        depth: f64,
        anchor: Option<ItemId>,
        visible_before: impl IntoIterator<Item = (ItemId, Lane, ItemAttributes)>,
    ) {
        self.clear();
        self.active = true;
        self.depth_before = depth;
        self.anchor = anchor;
        self.visible_before.extend(
            visible_before
                .into_iter()
                .map(|(id, lane, attributes)| (id, (lane, attributes))),
        );
    }

    /// Records the batch's inserts and deletes and derives the scroll delta
    /// and auto-scroll flag.
    ///
    /// Ids that are listed as inserted but were already in `before`, or listed
    /// as deleted but are still in `after`, are ignored.
    pub fn record_changes(
        &mut self,
        before: &SortIndex,
        after: &SortIndex,
        inserted: &[ItemId],
        deleted: &[ItemId],
    ) {
        self.inserted.extend(
            inserted
                .iter()
                .copied()
                .filter(|&id| after.contains(id) && !before.contains(id)),
        );
        self.deleted.extend(
            deleted
                .iter()
                .copied()
                .filter(|&id| before.contains(id) && !after.contains(id)),
        );

        self.compensations.clear();
        if let Some(anchor) = self.anchor {
            self.compensate(anchor, before, after);
        }
        self.scroll_delta = self.compensations.iter().map(|c| c.delta).sum();

        let live_terminal = after.lane_terminal_rank(Lane::LIVE);
        let lands_at_live_end = self
            .inserted
            .iter()
            .any(|&id| after.rank_of(id).is_some_and(|rank| Some(rank) == live_terminal));
        let caught_up = self.anchor.is_some() && self.anchor == before.newest();
        self.auto_scroll = !self.inserted.is_empty() && (lands_at_live_end || caught_up);

        self.moved = self
            .visible_before
            .keys()
            .filter(|&&id| match (before.rank_of(id), after.rank_of(id)) {
                (Some(old), Some(new)) => old != new,
                _ => false,
            })
            .count();
    }

    fn compensate(&mut self, anchor: ItemId, before: &SortIndex, after: &SortIndex) {
        let item_depth = after.item_depth();
        let Some(anchor_before) = before.rank_of(anchor) else {
            return;
        };

        match after.rank_of(anchor) {
            Some(anchor_after) => {
                for &id in &self.inserted {
                    if after.rank_of(id).is_some_and(|rank| rank < anchor_after) {
                        self.compensations.push(Compensation {
                            item: id,
                            kind: ChangeKind::Insert,
                            delta: item_depth,
                        });
                    }
                }
            }
            None => {
                // The anchor itself was deleted; place inserts by sort key.
                let anchor_key = before.sort_key(anchor).unwrap_or(f64::INFINITY);
                for &id in &self.inserted {
                    let before_anchor = after
                        .sort_key(id)
                        .is_some_and(|key| key.total_cmp(&anchor_key) == Ordering::Less);
                    if before_anchor {
                        self.compensations.push(Compensation {
                            item: id,
                            kind: ChangeKind::Insert,
                            delta: item_depth,
                        });
                    }
                }
            }
        }

        for &id in &self.deleted {
            if before.rank_of(id).is_some_and(|rank| rank < anchor_before) {
                self.compensations.push(Compensation {
                    item: id,
                    kind: ChangeKind::Delete,
                    delta: -item_depth,
                });
            }
        }
    }

    /// Depth position the host should move to after the batch.
    ///
    /// With auto-scroll pending this is the newest item's focus position;
    /// otherwise `proposed` shifted by the scroll delta. Either way the result
    /// is clamped into `index`'s valid depth range.
    #[must_use]
    pub fn target_depth_position(&self, proposed: f64, index: &SortIndex) -> f64 {
        if self.active && self.auto_scroll {
            index.max_depth_position()
        } else {
            index.clamp_depth(proposed + self.scroll_delta)
        }
    }

    /// How `id` should animate across the open batch, if at all.
    #[must_use]
    pub fn transition(&self, id: ItemId) -> Option<ItemTransition> {
        if !self.active {
            None
        } else if self.inserted.contains(&id) {
            Some(ItemTransition::Appear)
        } else if self.deleted.contains(&id) {
            Some(ItemTransition::Disappear)
        } else if self.visible_before.contains_key(&id) {
            Some(ItemTransition::Reposition)
        } else {
            None
        }
    }

    /// Attributes `id` had when the batch opened, if it was visible.
    #[must_use]
    pub fn attributes_before(&self, id: ItemId) -> Option<ItemAttributes> {
        self.visible_before.get(&id).map(|&(_, attributes)| attributes)
    }

    /// Lane `id` was shown in when the batch opened, if it was visible.
    #[must_use]
    pub fn lane_before(&self, id: ItemId) -> Option<Lane> {
        self.visible_before.get(&id).map(|&(lane, _)| lane)
    }

    /// Depth position when the batch opened.
    #[inline]
    #[must_use]
    pub fn depth_before(&self) -> f64 {
        self.depth_before
    }

    /// Item focused when the batch opened.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<ItemId> {
        self.anchor
    }

    /// Accumulated scroll compensation.
    #[inline]
    #[must_use]
    pub fn scroll_delta(&self) -> f64 {
        self.scroll_delta
    }

    /// Whether the view should jump to the newest item.
    #[inline]
    #[must_use]
    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Individual contributions to [`scroll_delta`](Self::scroll_delta).
    #[must_use]
    pub fn compensations(&self) -> &[Compensation] {
        &self.compensations
    }

    /// Genuinely inserted items, in id order.
    pub fn inserted(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.inserted.iter().copied()
    }

    /// Genuinely deleted items, in id order.
    pub fn deleted(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.deleted.iter().copied()
    }

    /// Closes the batch, returning its summary and clearing all bookkeeping.
    pub fn finish(&mut self) -> BatchSummary {
        let summary = BatchSummary {
            inserted: self.inserted.len(),
            deleted: self.deleted.len(),
            moved: self.moved,
            scroll_delta: self.scroll_delta,
            auto_scroll: self.auto_scroll,
        };
        self.clear();
        summary
    }

    fn clear(&mut self) {
        self.active = false;
        self.depth_before = 0.0;
        self.anchor = None;
        self.visible_before.clear();
        self.inserted.clear();
        self.deleted.clear();
        self.compensations.clear();
        self.scroll_delta = 0.0;
        self.auto_scroll = false;
        self.moved = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ItemList, StackItem};

    const DEPTH: f64 = 100.0;

    fn lower(id: u64, value: f64) -> StackItem {
        StackItem::new(id, Lane::Lower, value)
    }

    fn base() -> ItemList {
        ItemList::from_items([lower(10, 10.0), lower(20, 20.0), lower(30, 30.0)])
    }

    fn run_batch(
        list: &mut ItemList,
        anchor: ItemId,
        depth: f64,
        insert: &[StackItem],
        delete: &[ItemId],
    ) -> (UpdateCoordinator, SortIndex) {
        let before = SortIndex::build(&*list, DEPTH);
        for &item in insert {
            list.push(item);
        }
        for &id in delete {
            list.remove(id);
        }
        let after = SortIndex::build(&*list, DEPTH);
        let inserted: Vec<_> = insert.iter().map(|item| item.id).collect();
        let mut coordinator = UpdateCoordinator::new();
        coordinator.begin(
            depth,
            Some(anchor),
            [(anchor, Lane::Lower, ItemAttributes::IDENTITY)],
        );
        coordinator.record_changes(&before, &after, &inserted, delete);
        (coordinator, after)
    }

    #[test]
    fn insert_after_anchor_needs_no_compensation() {
        let mut list = base();
        let (c, after) = run_batch(&mut list, ItemId(20), 150.0, &[lower(25, 25.0)], &[]);
        assert_eq!(c.scroll_delta(), 0.0);
        assert!(c.compensations().is_empty());
        assert_eq!(after.rank_of(ItemId(20)), Some(1));
        assert!(!c.auto_scroll());
        assert_eq!(c.target_depth_position(150.0, &after), 150.0);
    }

    #[test]
    fn insert_before_anchor_adds_one_slot() {
        let mut list = base();
        let (c, after) = run_batch(&mut list, ItemId(20), 150.0, &[lower(5, 5.0)], &[]);
        assert_eq!(c.scroll_delta(), DEPTH);
        assert_eq!(
            c.compensations(),
            &[Compensation {
                item: ItemId(5),
                kind: ChangeKind::Insert,
                delta: DEPTH,
            }]
        );
        assert_eq!(after.rank_of(ItemId(20)), Some(2));
        assert_eq!(c.target_depth_position(150.0, &after), 250.0);
    }

    #[test]
    fn delete_before_anchor_removes_one_slot() {
        let mut list = base();
        let (c, after) = run_batch(&mut list, ItemId(30), 200.0, &[], &[ItemId(10)]);
        assert_eq!(c.scroll_delta(), -DEPTH);
        assert_eq!(c.target_depth_position(200.0, &after), 100.0);
        assert_eq!(c.transition(ItemId(10)), Some(ItemTransition::Disappear));
    }

    #[test]
    fn deleted_anchor_places_inserts_by_key() {
        let mut list = base();
        let (c, _) = run_batch(
            &mut list,
            ItemId(20),
            100.0,
            &[lower(15, 15.0), lower(25, 25.0)],
            &[ItemId(20)],
        );
        // 15 sorts before the deleted anchor, 25 after it.
        assert_eq!(c.scroll_delta(), DEPTH);
    }

    #[test]
    fn insert_at_live_lane_end_requests_auto_scroll() {
        let mut list = base();
        let (c, after) = run_batch(&mut list, ItemId(10), 0.0, &[lower(40, 40.0)], &[]);
        assert!(c.auto_scroll());
        assert_eq!(c.target_depth_position(0.0, &after), 300.0);
    }

    #[test]
    fn caught_up_viewer_follows_new_items() {
        let mut list = base();
        let upper = StackItem::new(40, Lane::Upper, 40.0);
        let (c, after) = run_batch(&mut list, ItemId(30), 200.0, &[upper], &[]);
        assert!(c.auto_scroll(), "anchor was the newest item");
        assert_eq!(c.target_depth_position(200.0, &after), 300.0);
    }

    #[test]
    fn deletes_alone_never_auto_scroll() {
        let mut list = base();
        let (c, _) = run_batch(&mut list, ItemId(30), 200.0, &[], &[ItemId(20)]);
        assert!(!c.auto_scroll());
    }

    #[test]
    fn spurious_changes_are_ignored() {
        let mut list = base();
        let before = SortIndex::build(&list, DEPTH);
        list.push(lower(5, 5.0));
        let after = SortIndex::build(&list, DEPTH);
        let mut c = UpdateCoordinator::new();
        c.begin(100.0, Some(ItemId(20)), []);
        // 20 was already there; 99 never existed.
        c.record_changes(&before, &after, &[ItemId(20), ItemId(5)], &[ItemId(99)]);
        assert_eq!(c.inserted().collect::<Vec<_>>(), [ItemId(5)]);
        assert_eq!(c.deleted().count(), 0);
    }

    #[test]
    fn transitions_distinguish_moves_from_inserts() {
        let mut list = base();
        let (c, _) = run_batch(&mut list, ItemId(20), 100.0, &[lower(5, 5.0)], &[]);
        assert_eq!(c.transition(ItemId(5)), Some(ItemTransition::Appear));
        assert_eq!(c.transition(ItemId(20)), Some(ItemTransition::Reposition));
        assert_eq!(c.transition(ItemId(30)), None);
        assert_eq!(c.attributes_before(ItemId(20)), Some(ItemAttributes::IDENTITY));
        assert_eq!(c.lane_before(ItemId(20)), Some(Lane::Lower));
        assert_eq!(c.lane_before(ItemId(30)), None);
    }

    #[test]
    fn finish_summarizes_and_clears() {
        let mut list = base();
        let (mut c, after) = run_batch(&mut list, ItemId(20), 100.0, &[lower(5, 5.0)], &[]);
        let summary = c.finish();
        assert_eq!(
            summary,
            BatchSummary {
                inserted: 1,
                deleted: 0,
                moved: 1,
                scroll_delta: DEPTH,
                auto_scroll: false,
            }
        );
        assert!(!c.is_active());
        assert_eq!(c.scroll_delta(), 0.0);
        assert_eq!(c.transition(ItemId(5)), None);
        assert_eq!(c.target_depth_position(100.0, &after), 100.0);
    }
}
