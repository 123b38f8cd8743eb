// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global time ordering and per-lane depth ranges.
//!
//! A [`SortIndex`] is rebuilt wholesale from a [`StackSource`] whenever the
//! item set or its sort keys change. It flattens every lane into a single
//! ascending sequence, gives each item a *focus position* of
//! `rank * item_depth`, and assigns each item a half-open [`ZRange`] of depth
//! positions for which it is the frontmost item of its lane.
//!
//! Storage is struct-of-arrays indexed by global rank, so a rank doubles as
//! the slot index for every per-item cache built on top of the index.
//!
//! # Range assignment
//!
//! Within one lane, walking items in sort order:
//!
//! - the first item's range starts at 0, so a lane always has a frontmost
//!   item even before its first focus position is reached;
//! - every later item's range starts at its own focus position, one full slot
//!   past the previous item's last resting slot;
//! - each range ends where the next same-lane range starts; the terminal
//!   range is open (`end = +inf`).
//!
//! Ranges of different lanes are independent, which lets two stacks
//! interleave along one shared depth axis.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::source::{ItemId, Lane, StackSource};

/// Half-open interval `[start, end)` on the depth axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZRange {
    /// First depth position covered.
    pub start: f64,
    /// First depth position no longer covered; `+inf` for a lane's terminal
    /// item.
    pub end: f64,
}

impl ZRange {
    /// Creates a range.
    #[inline]
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `depth` lies in `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.start && depth < self.end
    }

    /// Returns `true` for a lane's terminal, unbounded range.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.end == f64::INFINITY
    }
}

/// Per-rank entry collected while building.
struct Entry {
    id: ItemId,
    lane: Lane,
    key: f64,
    seq: u32,
}

/// Time-sorted item sequence with cached focus positions and Z-ranges.
#[derive(Clone, Debug, PartialEq)]
pub struct SortIndex {
    item_depth: f64,

    // -- Per-rank data --
    ids: Vec<ItemId>,
    lanes: Vec<Lane>,
    keys: Vec<f64>,
    lane_positions: Vec<u32>,
    ranges: Vec<ZRange>,

    // -- Lookup --
    lane_ranks: [Vec<u32>; 2],
    by_id: BTreeMap<ItemId, u32>,
    unresolved: usize,
}

impl SortIndex {
    /// Creates an index with no items.
    #[must_use]
    pub fn empty(item_depth: f64) -> Self {
        Self {
            item_depth,
            ids: Vec::new(),
            lanes: Vec::new(),
            keys: Vec::new(),
            lane_positions: Vec::new(),
            ranges: Vec::new(),
            lane_ranks: [Vec::new(), Vec::new()],
            by_id: BTreeMap::new(),
            unresolved: 0,
        }
    }

    /// Builds the index from the current contents of `source`.
    ///
    /// Items with no sort value (or NaN) sort after all others; ties keep
    /// source order (lane by lane, then index within the lane). If an id
    /// appears more than once, only its first occurrence is indexed.
    pub fn build<S: StackSource + ?Sized>(source: &S, item_depth: f64) -> Self {
        let mut index = Self::empty(item_depth);
        let lane_count = source.lane_count().min(Lane::ALL.len());

        let mut entries = Vec::new();
        let mut seq = 0_u32;
        for lane in Lane::ALL.into_iter().take(lane_count) {
            for i in 0..source.item_count(lane) {
                let id = source.item_id(lane, i);
                if index.by_id.insert(id, seq).is_some() {
                    continue;
                }
                let key = match source.sort_value(id) {
                    Some(value) if !value.is_nan() => value,
                    _ => {
                        index.unresolved += 1;
                        f64::INFINITY
                    }
                };
                entries.push(Entry { id, lane, key, seq });
                seq += 1;
            }
        }

        entries.sort_unstable_by(|a, b| a.key.total_cmp(&b.key).then(a.seq.cmp(&b.seq)));

        let n = entries.len();
        index.ids.reserve(n);
        index.lanes.reserve(n);
        index.keys.reserve(n);
        index.lane_positions.reserve(n);
        index.ranges.reserve(n);
        for (rank, entry) in entries.iter().enumerate() {
            let rank = to_slot(rank);
            let lane_ranks = &mut index.lane_ranks[entry.lane.index()];
            index.ids.push(entry.id);
            index.lanes.push(entry.lane);
            index.keys.push(entry.key);
            index.lane_positions.push(to_slot(lane_ranks.len()));
            index.ranges.push(ZRange::new(0.0, f64::INFINITY));
            index.by_id.insert(entry.id, rank);
            lane_ranks.push(rank);
        }

        for lane_ranks in &index.lane_ranks {
            for (pos, &rank) in lane_ranks.iter().enumerate() {
                let start = if pos == 0 {
                    0.0
                } else {
                    f64::from(rank) * item_depth
                };
                let end = lane_ranks
                    .get(pos + 1)
                    .map_or(f64::INFINITY, |&next| f64::from(next) * item_depth);
                index.ranges[rank as usize] = ZRange::new(start, end);
            }
        }

        index
    }

    // -- Whole-sequence queries --

    /// Extent of one slot along the depth axis.
    #[inline]
    #[must_use]
    pub fn item_depth(&self) -> f64 {
        self.item_depth
    }

    /// Number of indexed items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no items are indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of items whose sort value could not be resolved.
    #[inline]
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.unresolved
    }

    /// Global end of the sequence: `len * item_depth`.
    #[inline]
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.ids.len() as f64 * self.item_depth
    }

    /// Largest meaningful depth position: the newest item's focus position,
    /// or 0 when empty.
    #[inline]
    #[must_use]
    pub fn max_depth_position(&self) -> f64 {
        (self.extent() - self.item_depth).max(0.0)
    }

    /// Clamps `depth` into `[0, max_depth_position]`.
    #[inline]
    #[must_use]
    pub fn clamp_depth(&self, depth: f64) -> f64 {
        if depth.is_nan() {
            return 0.0;
        }
        depth.clamp(0.0, self.max_depth_position())
    }

    /// Item ids in ascending sort order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    /// The item with the greatest rank.
    #[must_use]
    pub fn newest(&self) -> Option<ItemId> {
        self.ids.last().copied()
    }

    // -- Per-item queries --

    /// Global rank of `id`, if indexed.
    #[inline]
    #[must_use]
    pub fn rank_of(&self, id: ItemId) -> Option<usize> {
        self.by_id.get(&id).map(|&rank| rank as usize)
    }

    /// Returns `true` if `id` is indexed.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Focus position of `id`, if indexed.
    #[must_use]
    pub fn focus_position(&self, id: ItemId) -> Option<f64> {
        self.rank_of(id).map(|rank| self.focus_position_at(rank))
    }

    /// Z-range of `id`, if indexed.
    #[must_use]
    pub fn z_range(&self, id: ItemId) -> Option<ZRange> {
        self.rank_of(id).map(|rank| self.ranges[rank])
    }

    /// Lane of `id`, if indexed.
    #[must_use]
    pub fn lane_of(&self, id: ItemId) -> Option<Lane> {
        self.rank_of(id).map(|rank| self.lanes[rank])
    }

    /// Resolved sort key of `id` (`+inf` when unresolved), if indexed.
    #[must_use]
    pub fn sort_key(&self, id: ItemId) -> Option<f64> {
        self.rank_of(id).map(|rank| self.keys[rank])
    }

    // -- Per-rank accessors --
    //
    // These index directly into the struct-of-arrays storage.
    //
    // # Panics
    //
    // All `*_at` accessors panic if `rank >= len()`.

    /// Item id at `rank`.
    #[inline]
    #[must_use]
    pub fn id_at(&self, rank: usize) -> ItemId {
        self.ids[rank]
    }

    /// Lane of the item at `rank`.
    #[inline]
    #[must_use]
    pub fn lane_at(&self, rank: usize) -> Lane {
        self.lanes[rank]
    }

    /// Resolved sort key of the item at `rank`.
    #[inline]
    #[must_use]
    pub fn key_at(&self, rank: usize) -> f64 {
        self.keys[rank]
    }

    /// Position of the item at `rank` within its lane.
    #[inline]
    #[must_use]
    pub fn lane_position_at(&self, rank: usize) -> usize {
        self.lane_positions[rank] as usize
    }

    /// Z-range of the item at `rank`.
    #[inline]
    #[must_use]
    pub fn z_range_at(&self, rank: usize) -> ZRange {
        self.ranges[rank]
    }

    /// Focus position of the item at `rank`.
    #[inline]
    #[must_use]
    pub fn focus_position_at(&self, rank: usize) -> f64 {
        rank as f64 * self.item_depth
    }

    // -- Per-lane queries --

    /// Global ranks of the items in `lane`, ascending.
    #[inline]
    #[must_use]
    pub fn lane_ranks(&self, lane: Lane) -> &[u32] {
        &self.lane_ranks[lane.index()]
    }

    /// Number of items in `lane`.
    #[inline]
    #[must_use]
    pub fn lane_len(&self, lane: Lane) -> usize {
        self.lane_ranks[lane.index()].len()
    }

    /// Global rank of the newest item in `lane`.
    #[must_use]
    pub fn lane_terminal_rank(&self, lane: Lane) -> Option<usize> {
        self.lane_ranks(lane).last().map(|&rank| rank as usize)
    }

    /// Index into [`lane_ranks`](Self::lane_ranks) of the item whose range
    /// contains `depth`: the last item whose range starts at or before
    /// `depth`, or the first item when none does.
    #[must_use]
    pub fn lane_cursor(&self, lane: Lane, depth: f64) -> Option<usize> {
        let ranks = self.lane_ranks(lane);
        if ranks.is_empty() {
            return None;
        }
        let after = ranks.partition_point(|&rank| self.ranges[rank as usize].start <= depth);
        Some(after.saturating_sub(1))
    }
}

/// Converts a rank or lane position to the `u32` slot type.
#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "item counts are bounded far below u32::MAX"
)]
pub(crate) fn to_slot(n: usize) -> u32 {
    n as u32
}
