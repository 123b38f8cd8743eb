// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial re-rendering.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::plan::{PlanItem, StackPlan};

/// A region of the view that needs re-rendering.
///
/// Hosts can use this to redraw only the parts of the stack that changed
/// since the last plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire view needs redrawing.
    #[default]
    Full,
    /// Axis-aligned rectangles, in view coordinates, that need redrawing.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }

    /// Damage needed to go from `previous` to `current`.
    ///
    /// Every item that appeared, disappeared, or changed contributes its old
    /// and new on-screen bounds. Items that stay fully transparent contribute
    /// nothing.
    #[must_use]
    pub fn between(previous: &StackPlan, current: &StackPlan) -> Self {
        let mut rects = Vec::new();
        for item in &current.items {
            match previous.item(item.id) {
                Some(old) if same_pixels(old, item) => {}
                Some(old) => {
                    push_drawn(&mut rects, old);
                    push_drawn(&mut rects, item);
                }
                None => push_drawn(&mut rects, item),
            }
        }
        for old in &previous.items {
            if current.item(old.id).is_none() {
                push_drawn(&mut rects, old);
            }
        }
        if rects.is_empty() {
            Self::None
        } else {
            Self::Rects(rects)
        }
    }
}

fn same_pixels(a: &PlanItem, b: &PlanItem) -> bool {
    if a.opacity <= 0.0 && b.opacity <= 0.0 {
        return true;
    }
    a.bounds == b.bounds && a.transform == b.transform && a.opacity == b.opacity
}

fn push_drawn(rects: &mut Vec<Rect>, item: &PlanItem) {
    if item.opacity > 0.0 {
        rects.push(item.world_bounds());
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use kurbo::Affine;
    use strata_core::{ItemId, Lane};

    use crate::content::ContentKind;

    fn item(id: u64, x: f64, opacity: f64) -> PlanItem {
        PlanItem {
            id: ItemId(id),
            lane: Lane::Lower,
            content: ContentKind::Text,
            bounds: Rect::new(x, 0.0, x + 10.0, 10.0),
            transform: Affine::IDENTITY,
            opacity,
            normalized_offset: 0.0,
            transition: None,
        }
    }

    fn plan(items: Vec<PlanItem>) -> StackPlan {
        StackPlan { depth: 0.0, items }
    }

    #[test]
    fn merge_full_absorbs_everything() {
        let mut d = DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]);
        d.merge(&DamageRegion::Full);
        assert_eq!(d, DamageRegion::Full);
    }

    #[test]
    fn merge_none_is_neutral() {
        let rects = DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]);
        let mut d = DamageRegion::None;
        d.merge(&rects);
        assert_eq!(d, rects);
        d.merge(&DamageRegion::None);
        assert_eq!(d, rects);
    }

    #[test]
    fn unchanged_plans_need_no_redraw() {
        let a = plan(vec![item(1, 0.0, 1.0), item(2, 20.0, 0.5)]);
        assert!(DamageRegion::between(&a, &a.clone()).is_empty());
    }

    #[test]
    fn moved_items_damage_old_and_new_bounds() {
        let a = plan(vec![item(1, 0.0, 1.0)]);
        let b = plan(vec![item(1, 50.0, 1.0)]);
        assert_eq!(
            DamageRegion::between(&a, &b),
            DamageRegion::Rects(vec![
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(50.0, 0.0, 60.0, 10.0),
            ])
        );
    }

    #[test]
    fn removed_and_invisible_items() {
        let a = plan(vec![item(1, 0.0, 1.0), item(2, 20.0, 0.0)]);
        let b = plan(vec![item(3, 40.0, 0.0)]);
        assert_eq!(
            DamageRegion::between(&a, &b),
            DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 10.0, 10.0)])
        );
    }
}
