// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frontmost-item and focus-amount queries.
//!
//! [`FocusTracker`] is a borrowed view over a [`SortIndex`]. Every query takes
//! the depth position explicitly and reads only cached geometry.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::index::SortIndex;
use crate::source::{ItemId, Lane};

/// Derives per-lane focus state from a [`SortIndex`].
#[derive(Clone, Copy, Debug)]
pub struct FocusTracker<'a> {
    index: &'a SortIndex,
}

impl<'a> FocusTracker<'a> {
    /// Creates a tracker over `index`.
    #[inline]
    #[must_use]
    pub const fn new(index: &'a SortIndex) -> Self {
        Self { index }
    }

    /// Global rank of the frontmost item in `lane` at `depth`.
    ///
    /// This is the highest-ranked item whose range starts at or before
    /// `depth`, or the lane's first item if `depth` is before every range.
    #[must_use]
    pub fn frontmost_rank(&self, lane: Lane, depth: f64) -> Option<usize> {
        let cursor = self.index.lane_cursor(lane, depth)?;
        Some(self.index.lane_ranks(lane)[cursor] as usize)
    }

    /// The frontmost item in `lane` at `depth`.
    #[must_use]
    pub fn frontmost_item(&self, lane: Lane, depth: f64) -> Option<ItemId> {
        self.frontmost_rank(lane, depth)
            .map(|rank| self.index.id_at(rank))
    }

    /// Signed distance `focus(frontmost) - depth` for `lane`.
    #[must_use]
    pub fn lane_vector(&self, lane: Lane, depth: f64) -> Option<f64> {
        self.frontmost_rank(lane, depth)
            .map(|rank| self.index.focus_position_at(rank) - depth)
    }

    /// How centered the viewer is on `lane`, in `[0, 1]`.
    ///
    /// Sums `1 - distance / item_depth` over the lane's items within one slot
    /// of `depth`. Only the two global ranks bracketing `depth` can be that
    /// close, so this is constant-time.
    #[must_use]
    pub fn focus_amount(&self, lane: Lane, depth: f64) -> f64 {
        let item_depth = self.index.item_depth();
        let pos = depth / item_depth;
        if !pos.is_finite() || self.index.is_empty() {
            return 0.0;
        }
        let last = (self.index.len() - 1) as f64;
        let below = pos.floor();
        let mut amount = 0.0;
        for candidate in [below, below + 1.0] {
            if !(0.0..=last).contains(&candidate) {
                continue;
            }
            #[expect(
                clippy::cast_possible_truncation,
                reason = "candidate is a whole number in [0, len - 1]"
            )]
            let rank = candidate as usize;
            if self.index.lane_at(rank) != lane {
                continue;
            }
            let distance = (self.index.focus_position_at(rank) - depth).abs();
            amount += (1.0 - distance / item_depth).max(0.0);
        }
        amount.clamp(0.0, 1.0)
    }

    /// Global rank of the globally focused item at `depth`.
    ///
    /// Among the lanes' frontmost items that have not yet receded by a full
    /// slot (`vector > -item_depth`), picks the latest one whose focus
    /// position is at or before `depth`. When every candidate still lies
    /// ahead, the earliest of them is focused.
    #[must_use]
    pub fn focused_rank(&self, depth: f64) -> Option<usize> {
        let item_depth = self.index.item_depth();
        let mut reached: Option<usize> = None;
        let mut ahead: Option<usize> = None;
        for rank in Lane::ALL
            .into_iter()
            .filter_map(|lane| self.frontmost_rank(lane, depth))
        {
            let vector = self.index.focus_position_at(rank) - depth;
            if vector <= -item_depth {
                continue;
            }
            // Focus positions grow with rank, so ranks order them.
            if vector <= 0.0 {
                reached = reached.max(Some(rank));
            } else {
                ahead = Some(ahead.map_or(rank, |a| a.min(rank)));
            }
        }
        reached.or(ahead)
    }

    /// The globally focused item at `depth`.
    #[must_use]
    pub fn focused_item(&self, depth: f64) -> Option<ItemId> {
        self.focused_rank(depth).map(|rank| self.index.id_at(rank))
    }
}
