// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-to-attribute mapping.
//!
//! [`DepthAttributeMapper`] is a pure function of the sort index, a lane's
//! frontmost item, and the depth position. It never caches and never looks
//! at anything but its [`LayoutConfig`].
//!
//! For a lane whose frontmost item is `F`:
//!
//! ```text
//! vector         = focus(F) - depth
//! vector_to_item = vector + (rank(item) - rank(F)) * item_depth
//! ```
//!
//! A positive `vector_to_item` means the item's focus position is still ahead
//! of the pointer: it sits behind the frontmost slot and recedes along the
//! keypoint curves over `stack_depth` slots. A negative value means the
//! pointer has passed it: the item grows, rises, and fades out over one slot
//! as it moves past the viewer.

use crate::config::LayoutConfig;
use crate::index::SortIndex;

/// Visual attributes of one item at one depth position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemAttributes {
    /// Uniform scale about the item's anchor.
    pub scale: f64,
    /// Vertical displacement in layout units; negative moves up.
    pub vertical_offset: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Signed distance from the frontmost slot in `[-1, 1]`: negative when
    /// receding, positive when approaching, 0 in focus.
    pub normalized_offset: f64,
}

impl ItemAttributes {
    /// Perfectly in focus: unscaled, unmoved, fully opaque.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        vertical_offset: 0.0,
        opacity: 1.0,
        normalized_offset: 0.0,
    };

    /// Returns `true` if the item is exactly in focus.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.vertical_offset == 0.0 && self.opacity == 1.0
    }

    /// Returns `true` if the item contributes any pixels.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Returns a copy with a different opacity.
    #[inline]
    #[must_use]
    pub const fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Maps depth positions to [`ItemAttributes`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthAttributeMapper {
    config: LayoutConfig,
}

impl DepthAttributeMapper {
    /// Creates a mapper for `config`.
    #[inline]
    #[must_use]
    pub const fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The configuration this mapper samples.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Number of ranks on either side of the frontmost item that are still
    /// computed.
    #[inline]
    #[must_use]
    pub const fn cull_distance(&self) -> usize {
        self.config.stack_depth as usize + 1
    }

    /// Returns `true` if the item at `item_rank` is too far from the
    /// frontmost item to be computed.
    #[inline]
    #[must_use]
    pub const fn is_culled(&self, frontmost_rank: usize, item_rank: usize) -> bool {
        frontmost_rank.abs_diff(item_rank) > self.cull_distance()
    }

    /// Signed distance from the pointer to the item, given the lane vector.
    #[inline]
    #[must_use]
    pub fn vector_to_item(&self, vector: f64, frontmost_rank: usize, item_rank: usize) -> f64 {
        let slots = item_rank as f64 - frontmost_rank as f64;
        vector + slots * self.config.item_depth
    }

    /// Normalizes a signed item vector into `[-1, 1]`.
    ///
    /// Receding items are scaled by the whole visible stack, approaching ones
    /// by a single slot.
    #[must_use]
    pub fn normalized_offset(&self, vector_to_item: f64) -> f64 {
        let normalized = if vector_to_item > 0.0 {
            -vector_to_item / self.config.stack_extent()
        } else if vector_to_item < 0.0 {
            -vector_to_item / self.config.item_depth
        } else {
            0.0
        };
        normalized.clamp(-1.0, 1.0)
    }

    /// Maps a normalized offset to attributes.
    #[must_use]
    pub fn map(&self, normalized: f64) -> ItemAttributes {
        if normalized < 0.0 {
            let t = -normalized;
            ItemAttributes {
                scale: self.config.scaling.sample(t),
                vertical_offset: self.config.spacing.sample(t),
                opacity: self.config.alpha.sample(t),
                normalized_offset: normalized,
            }
        } else if normalized > 0.0 {
            ItemAttributes {
                scale: normalized + 1.0,
                vertical_offset: -normalized * self.config.item_depth,
                opacity: 1.0 - normalized,
                normalized_offset: normalized,
            }
        } else {
            ItemAttributes::IDENTITY
        }
    }

    /// Attributes of the item at `item_rank` while the item at
    /// `frontmost_rank` is its lane's frontmost, or `None` if culled.
    ///
    /// # Panics
    ///
    /// Panics if `frontmost_rank` is out of bounds for `index`.
    #[must_use]
    pub fn attributes(
        &self,
        index: &SortIndex,
        frontmost_rank: usize,
        item_rank: usize,
        depth: f64,
    ) -> Option<ItemAttributes> {
        if self.is_culled(frontmost_rank, item_rank) {
            return None;
        }
        let vector = index.focus_position_at(frontmost_rank) - depth;
        let vector_to_item = self.vector_to_item(vector, frontmost_rank, item_rank);
        Some(self.map(self.normalized_offset(vector_to_item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ItemId, ItemList, Lane, StackItem};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn mapper() -> DepthAttributeMapper {
        DepthAttributeMapper::new(LayoutConfig::time_machine())
    }

    #[test]
    fn zero_maps_to_identity() {
        assert_eq!(mapper().map(0.0), ItemAttributes::IDENTITY);
        assert!(mapper().map(0.0).is_identity());
    }

    #[test]
    fn receding_follows_keypoints() {
        let m = mapper();
        let a = m.map(-1.0 / 3.0);
        assert!(close(a.scale, 0.92));
        assert!(close(a.vertical_offset, -24.0));
        assert!(close(a.opacity, 0.6));

        let end = m.map(-1.0);
        assert!(close(end.scale, 0.8));
        assert!(close(end.vertical_offset, -56.0));
        assert!(close(end.opacity, 0.0));
        assert!(!end.is_visible());
    }

    #[test]
    fn approaching_grows_rises_and_fades() {
        let a = mapper().map(0.5);
        assert!(close(a.scale, 1.5));
        assert!(close(a.vertical_offset, -50.0));
        assert!(close(a.opacity, 0.5));
    }

    #[test]
    fn normalization_uses_stack_for_receding_and_slot_for_approaching() {
        let m = mapper();
        assert!(close(m.normalized_offset(150.0), -0.5));
        assert!(close(m.normalized_offset(-50.0), 0.5));
        assert!(close(m.normalized_offset(0.0), 0.0));
        assert!(close(m.normalized_offset(1e6), -1.0));
        assert!(close(m.normalized_offset(-1e6), 1.0));
    }

    #[test]
    fn attributes_stay_in_bounds() {
        let m = mapper();
        for step in -40..=40 {
            let n = f64::from(step) / 40.0;
            let a = m.map(n);
            assert!(a.scale >= 0.0, "scale {} at {n}", a.scale);
            assert!((0.0..=1.0).contains(&a.opacity), "opacity {} at {n}", a.opacity);
        }
    }

    #[test]
    fn culls_beyond_stack_depth_plus_one() {
        let m = mapper();
        assert!(!m.is_culled(10, 14));
        assert!(m.is_culled(10, 15));
        assert!(!m.is_culled(10, 6));
        assert!(m.is_culled(10, 5));
    }

    #[test]
    fn identity_at_each_focus_position() {
        let list = ItemList::from_items((0..6).map(|i| StackItem::new(i, Lane::Lower, i as f64)));
        let index = SortIndex::build(&list, 100.0);
        let m = mapper();
        for rank in 0..index.len() {
            let depth = index.focus_position_at(rank);
            let front = index.lane_cursor(Lane::Lower, depth).unwrap();
            let front_rank = index.lane_ranks(Lane::Lower)[front] as usize;
            let a = m.attributes(&index, front_rank, rank, depth).unwrap();
            assert!(a.is_identity(), "rank {rank}: {a:?}");
        }
        assert_eq!(index.rank_of(ItemId(3)), Some(3));
    }

    #[test]
    fn item_behind_frontmost_recedes() {
        let list = ItemList::from_items((0..4).map(|i| StackItem::new(i, Lane::Lower, i as f64)));
        let index = SortIndex::build(&list, 100.0);
        let a = mapper().attributes(&index, 0, 1, 0.0).unwrap();
        assert!(close(a.normalized_offset, -1.0 / 3.0));
        assert!(close(a.scale, 0.92));
        assert!(mapper().attributes(&index, 0, 3, 0.0).is_some());
    }
}
