// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item identity, lanes, and the data-source seam.
//!
//! The engine never owns items. Every rebuild reads the current item set from
//! a [`StackSource`], which hands out a stable caller-defined [`ItemId`], the
//! [`Lane`] the item lives in, and an optional sort value.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

/// A caller-defined, stable item identifier.
///
/// The engine keys every cache by this value, so it must stay the same for an
/// item across rebuilds (a message id, a database row id, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

/// One of the two stacks sharing the depth axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lane {
    /// The upper stack, holding older context.
    Upper,
    /// The lower stack, holding the live conversation.
    Lower,
}

impl Lane {
    /// Both lanes in index order.
    pub const ALL: [Self; 2] = [Self::Upper, Self::Lower];

    /// The lane that receives new items and drives auto-scroll.
    pub const LIVE: Self = Self::Lower;

    /// Returns the lane's 0-based index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Upper => 0,
            Self::Lower => 1,
        }
    }

    /// Returns the lane for a 0-based index, or `None` if out of range.
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Upper),
            1 => Some(Self::Lower),
            _ => None,
        }
    }
}

/// Supplies the current item set to the engine.
///
/// Implementations are read once per rebuild; the engine keeps nothing but
/// derived geometry keyed by [`ItemId`].
pub trait StackSource {
    /// Number of lanes in use (0, 1, or 2). Larger values are clamped to 2.
    fn lane_count(&self) -> usize;

    /// Number of items in `lane`.
    fn item_count(&self, lane: Lane) -> usize;

    /// Identifier of the item at `index` within `lane`.
    fn item_id(&self, lane: Lane, index: usize) -> ItemId;

    /// Sort value for `item`.
    ///
    /// `None` (and NaN) sort after every resolved value.
    fn sort_value(&self, item: ItemId) -> Option<f64>;
}

/// One entry of an [`ItemList`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackItem {
    /// Stable identifier.
    pub id: ItemId,
    /// Lane the item is shown in.
    pub lane: Lane,
    /// Sort value, or `None` if it is not known yet.
    pub sort_value: Option<f64>,
}

impl StackItem {
    /// Creates an item with a resolved sort value.
    #[must_use]
    pub const fn new(id: u64, lane: Lane, sort_value: f64) -> Self {
        Self {
            id: ItemId(id),
            lane,
            sort_value: Some(sort_value),
        }
    }

    /// Creates an item whose sort value is not known.
    #[must_use]
    pub const fn unresolved(id: u64, lane: Lane) -> Self {
        Self {
            id: ItemId(id),
            lane,
            sort_value: None,
        }
    }
}

/// A simple owned [`StackSource`] backed by per-lane vectors.
///
/// Hosts with their own model types implement [`StackSource`] directly; this
/// type is convenient for tests and tools. Sort values are looked up by id
/// in logarithmic time; for a duplicated id the earliest added entry wins.
#[derive(Clone, Debug, Default)]
pub struct ItemList {
    lanes: [Vec<StackItem>; 2],
    values: BTreeMap<ItemId, Option<f64>>,
}

impl ItemList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list from items, preserving their order within each lane.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = StackItem>) -> Self {
        let mut list = Self::new();
        for item in items {
            list.push(item);
        }
        list
    }

    /// Appends an item to the end of its lane.
    pub fn push(&mut self, item: StackItem) {
        self.values.entry(item.id).or_insert(item.sort_value);
        self.lanes[item.lane.index()].push(item);
    }

    /// Inserts an item at `index` within its lane.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the lane's length.
    pub fn insert(&mut self, index: usize, item: StackItem) {
        self.lanes[item.lane.index()].insert(index, item);
        self.values.entry(item.id).or_insert(item.sort_value);
    }

    /// Removes the item with the given id, returning it if present.
    pub fn remove(&mut self, id: ItemId) -> Option<StackItem> {
        let removed = self.lanes.iter_mut().find_map(|lane| {
            let pos = lane.iter().position(|item| item.id == id)?;
            Some(lane.remove(pos))
        })?;
        // A duplicate may still be listed under the same id.
        match self.lanes.iter().flatten().find(|item| item.id == id) {
            Some(item) => {
                self.values.insert(id, item.sort_value);
            }
            None => {
                self.values.remove(&id);
            }
        }
        Some(removed)
    }

    /// Returns the items of `lane` in insertion order.
    #[must_use]
    pub fn lane(&self, lane: Lane) -> &[StackItem] {
        &self.lanes[lane.index()]
    }

    /// Total number of items across lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no lane holds an item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Vec::is_empty)
    }

}

impl StackSource for ItemList {
    fn lane_count(&self) -> usize {
        if self.lanes[1].is_empty() {
            usize::from(!self.lanes[0].is_empty())
        } else {
            2
        }
    }

    fn item_count(&self, lane: Lane) -> usize {
        self.lanes[lane.index()].len()
    }

    fn item_id(&self, lane: Lane, index: usize) -> ItemId {
        self.lanes[lane.index()][index].id
    }

    fn sort_value(&self, item: ItemId) -> Option<f64> {
        self.values.get(&item).copied().flatten()
    }
}
