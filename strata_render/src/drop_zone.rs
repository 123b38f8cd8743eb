// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-zone opacity override.
//!
//! While the user drags content over the stack to send it, the lane it would
//! land in is dimmed so the drop target reads clearly. This runs after the
//! plan is built and never feeds back into the engine.

use strata_core::Lane;

use crate::plan::StackPlan;

/// Dims one lane of a plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropZone {
    /// Lane under the drag.
    pub lane: Lane,
    /// Opacity multiplier for the lane's items, in `[0, 1]`.
    pub opacity: f64,
}

impl DropZone {
    /// Fully hides `lane`.
    #[must_use]
    pub const fn suppress(lane: Lane) -> Self {
        Self { lane, opacity: 0.0 }
    }

    /// Dims `lane` to `opacity`, clamped into `[0, 1]`. NaN hides the lane.
    #[must_use]
    pub fn dim(lane: Lane, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        Self { lane, opacity }
    }

    /// Applies the override to every item of the lane in `plan`.
    pub fn apply(&self, plan: &mut StackPlan) {
        for item in plan.items.iter_mut().filter(|item| item.lane == self.lane) {
            item.opacity *= self.opacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use kurbo::{Affine, Rect};
    use strata_core::ItemId;

    use crate::content::ContentKind;
    use crate::plan::PlanItem;

    fn item(id: u64, lane: Lane) -> PlanItem {
        PlanItem {
            id: ItemId(id),
            lane,
            content: ContentKind::Text,
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            transform: Affine::IDENTITY,
            opacity: 0.8,
            normalized_offset: 0.0,
            transition: None,
        }
    }

    #[test]
    fn only_the_target_lane_is_touched() {
        let mut plan = StackPlan {
            depth: 0.0,
            items: vec![item(1, Lane::Upper), item(2, Lane::Lower)],
        };
        DropZone::suppress(Lane::Lower).apply(&mut plan);
        assert_eq!(plan.item(ItemId(1)).map(|i| i.opacity), Some(0.8));
        assert_eq!(plan.item(ItemId(2)).map(|i| i.opacity), Some(0.0));
    }

    #[test]
    fn dimming_multiplies_and_clamps() {
        let mut plan = StackPlan {
            depth: 0.0,
            items: vec![item(1, Lane::Upper)],
        };
        DropZone::dim(Lane::Upper, 0.5).apply(&mut plan);
        assert!((plan.items[0].opacity - 0.4).abs() < 1e-12);
        assert_eq!(DropZone::dim(Lane::Upper, 3.0).opacity, 1.0);
        assert_eq!(DropZone::dim(Lane::Upper, f64::NAN).opacity, 0.0);
    }
}
