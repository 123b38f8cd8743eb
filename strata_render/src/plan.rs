// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack plan: an ordered sequence of draw items for one layout pass.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use strata_core::{DepthStack, ItemAttributes, ItemId, ItemTransition, Lane};

use crate::content::{Anchor, ContentKind};

/// Host-side knowledge about item content.
pub trait ContentLookup {
    /// Kind of content `id` shows.
    fn content_kind(&self, id: ItemId) -> ContentKind;

    /// Unscaled size of `id`.
    fn item_size(&self, id: ItemId) -> Size;
}

/// Where each lane's frontmost slot sits in view coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackGeometry {
    slots: [Rect; 2],
}

impl StackGeometry {
    /// Creates geometry from the two lanes' slot rectangles.
    #[must_use]
    pub const fn new(upper: Rect, lower: Rect) -> Self {
        Self {
            slots: [upper, lower],
        }
    }

    /// Slot rectangle of `lane`.
    #[must_use]
    pub const fn slot(&self, lane: Lane) -> Rect {
        self.slots[lane.index()]
    }

    /// Unscaled bounds of an item of `size` resting in `lane`'s slot: left
    /// aligned, sitting on the slot's bottom edge.
    #[must_use]
    pub fn item_bounds(&self, lane: Lane, size: Size) -> Rect {
        let slot = self.slot(lane);
        Rect::new(slot.x0, slot.y1 - size.height, slot.x0 + size.width, slot.y1)
    }
}

/// Transform that scales `bounds` about `anchor` and then shifts it
/// vertically, as described by `attributes`.
#[must_use]
pub fn transform_for(bounds: Rect, anchor: Anchor, attributes: &ItemAttributes) -> Affine {
    let pivot = Point::new(
        bounds.x0 + anchor.x * bounds.width(),
        bounds.y0 + anchor.y * bounds.height(),
    )
    .to_vec2();
    Affine::translate(Vec2::new(0.0, attributes.vertical_offset))
        * Affine::translate(pivot)
        * Affine::scale(attributes.scale)
        * Affine::translate(-pivot)
}

/// A single draw command in the stack plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanItem {
    /// The item this draw comes from.
    pub id: ItemId,
    /// Lane the item is shown in.
    pub lane: Lane,
    /// Kind of content.
    pub content: ContentKind,
    /// Unscaled bounds in view coordinates.
    pub bounds: Rect,
    /// Transform applied to `bounds`.
    pub transform: Affine,
    /// Final opacity.
    pub opacity: f64,
    /// Signed distance from the frontmost slot; orders the plan.
    pub normalized_offset: f64,
    /// Animation hint while a batch update is open.
    pub transition: Option<ItemTransition>,
}

impl PlanItem {
    /// Axis-aligned bounds after the transform.
    #[must_use]
    pub fn world_bounds(&self) -> Rect {
        self.transform.transform_rect_bbox(self.bounds)
    }
}

/// An ordered list of draw commands for one layout pass.
///
/// Items are in back-to-front order: the most receded first, items moving
/// past the viewer last.
#[derive(Clone, Debug, Default)]
pub struct StackPlan {
    /// Depth position the plan was built at.
    pub depth: f64,
    /// Draw items in back-to-front order.
    pub items: Vec<PlanItem>,
}

impl StackPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.depth = 0.0;
        self.items.clear();
    }

    /// Builds a plan from the stack's last evaluated pass.
    #[must_use]
    pub fn build(
        stack: &DepthStack,
        geometry: &StackGeometry,
        content: &impl ContentLookup,
    ) -> Self {
        let mut plan = Self::new();
        plan.build_into(stack, geometry, content);
        plan
    }

    /// Like [`build`](Self::build), but reuses this plan's allocation.
    ///
    /// While a batch update is open, deleted items that were visible before
    /// the batch are included at their fading exit attributes.
    pub fn build_into(
        &mut self,
        stack: &DepthStack,
        geometry: &StackGeometry,
        content: &impl ContentLookup,
    ) {
        self.clear();
        self.depth = stack.depth_position();

        for item in stack.visible() {
            self.push(
                geometry,
                content,
                item.id,
                item.lane,
                &item.attributes,
                stack.transition(item.id),
            );
        }
        for id in stack.deleted_in_batch() {
            let (Some(lane), Some(attributes)) = (
                stack.lane_before_batch(id),
                stack.final_attributes_for_disappearing_item(id),
            ) else {
                continue;
            };
            self.push(
                geometry,
                content,
                id,
                lane,
                &attributes,
                Some(ItemTransition::Disappear),
            );
        }

        // Stable, so equal offsets keep the engine's newest-first order.
        self.items
            .sort_by(|a, b| a.normalized_offset.total_cmp(&b.normalized_offset));
    }

    fn push(
        &mut self,
        geometry: &StackGeometry,
        content: &impl ContentLookup,
        id: ItemId,
        lane: Lane,
        attributes: &ItemAttributes,
        transition: Option<ItemTransition>,
    ) {
        let kind = content.content_kind(id);
        let bounds = geometry.item_bounds(lane, content.item_size(id));
        let opacity = if attributes.normalized_offset < 0.0 && !kind.shows_when_receding() {
            0.0
        } else {
            attributes.opacity
        };
        self.items.push(PlanItem {
            id,
            lane,
            content: kind,
            bounds,
            transform: transform_for(bounds, kind.anchor(), attributes),
            opacity,
            normalized_offset: attributes.normalized_offset,
            transition,
        });
    }

    /// The draw item for `id`, if present.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&PlanItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use strata_core::{ItemList, LayoutConfig, StackItem};

    struct Chat;

    impl ContentLookup for Chat {
        fn content_kind(&self, id: ItemId) -> ContentKind {
            match id.0 {
                99 => ContentKind::Typing,
                n if n % 2 == 0 => ContentKind::Image,
                _ => ContentKind::Text,
            }
        }

        fn item_size(&self, _id: ItemId) -> Size {
            Size::new(200.0, 40.0)
        }
    }

    fn geometry() -> StackGeometry {
        StackGeometry::new(
            Rect::new(0.0, 0.0, 320.0, 200.0),
            Rect::new(0.0, 300.0, 320.0, 500.0),
        )
    }

    fn evaluated(items: &[StackItem], depth: f64) -> (ItemList, DepthStack) {
        let list = ItemList::from_items(items.iter().copied());
        let mut stack = DepthStack::new(LayoutConfig::time_machine());
        stack.prepare(&list);
        let _ = stack.evaluate(depth);
        (list, stack)
    }

    #[test]
    fn identity_attributes_give_identity_transform() {
        let bounds = Rect::new(10.0, 20.0, 110.0, 60.0);
        let t = transform_for(bounds, Anchor::BOTTOM_CENTER, &ItemAttributes::IDENTITY);
        assert_eq!(t.transform_rect_bbox(bounds), bounds);
    }

    #[test]
    fn scaling_keeps_the_anchor_fixed() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 40.0);
        let attributes = ItemAttributes {
            scale: 0.5,
            vertical_offset: -10.0,
            opacity: 1.0,
            normalized_offset: -0.5,
        };
        let t = transform_for(bounds, Anchor::BOTTOM_CENTER, &attributes);
        let anchor = t * Point::new(50.0, 40.0);
        assert!((anchor.x - 50.0).abs() < 1e-9);
        assert!((anchor.y - 30.0).abs() < 1e-9);
        let scaled = t.transform_rect_bbox(bounds);
        assert!((scaled.width() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn items_sit_on_their_lane_baseline() {
        let g = geometry();
        let b = g.item_bounds(Lane::Lower, Size::new(200.0, 40.0));
        assert_eq!(b, Rect::new(0.0, 460.0, 200.0, 500.0));
    }

    #[test]
    fn plan_is_back_to_front() {
        let items: Vec<_> = (1..=5)
            .map(|i| StackItem::new(i, Lane::Lower, i as f64))
            .collect();
        let (_, stack) = evaluated(&items, 150.0);
        let plan = StackPlan::build(&stack, &geometry(), &Chat);
        let order: Vec<_> = plan.items.iter().map(|item| item.id.0).collect();
        assert_eq!(order, [5, 4, 3, 2, 1]);
        for pair in plan.items.windows(2) {
            assert!(pair[0].normalized_offset <= pair[1].normalized_offset);
        }
        assert_eq!(plan.depth, 150.0);
    }

    #[test]
    fn typing_indicator_hides_when_receding() {
        let items = [
            StackItem::new(1, Lane::Lower, 1.0),
            StackItem::new(99, Lane::Lower, 2.0),
        ];
        let (_, stack) = evaluated(&items, 0.0);
        let plan = StackPlan::build(&stack, &geometry(), &Chat);
        assert_eq!(plan.item(ItemId(99)).map(|item| item.opacity), Some(0.0));
        assert_eq!(plan.item(ItemId(1)).map(|item| item.opacity), Some(1.0));
    }

    #[test]
    fn deleted_items_fade_out_during_a_batch() {
        let items = [
            StackItem::new(1, Lane::Lower, 1.0),
            StackItem::new(2, Lane::Lower, 2.0),
            StackItem::new(3, Lane::Lower, 3.0),
        ];
        let (mut list, mut stack) = evaluated(&items, 100.0);
        list.remove(ItemId(3));
        let _ = stack.prepare_for_batch_update(&list, &[], &[ItemId(3)]);
        let _ = stack.evaluate(stack.depth_position());

        let plan = StackPlan::build(&stack, &geometry(), &Chat);
        let exiting = plan.item(ItemId(3)).unwrap();
        assert_eq!(exiting.transition, Some(ItemTransition::Disappear));
        assert_eq!(exiting.opacity, 0.0);
        assert_eq!(
            plan.item(ItemId(2)).unwrap().transition,
            Some(ItemTransition::Reposition)
        );

        let _ = stack.finalize_batch_update();
        let plan = StackPlan::build(&stack, &geometry(), &Chat);
        assert!(plan.item(ItemId(3)).is_none());
        assert_eq!(plan.item(ItemId(2)).unwrap().transition, None);
    }
}
