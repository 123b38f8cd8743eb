// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and damage tracking for strata depth stacks.
//!
//! This crate sits between [`strata_core`]'s layout evaluation and whatever
//! draws the stack. It turns per-item attributes into positioned draw
//! commands:
//!
//! - [`ContentKind`]: what an item shows, and where it scales from
//! - [`PlanItem`] / [`StackPlan`]: back-to-front draw commands for one pass
//! - [`DamageRegion`]: spatial damage between two plans
//! - [`DropZone`]: the drag-to-send lane override

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod content;
mod damage;
mod drop_zone;
mod plan;

pub use content::{Anchor, ContentKind};
pub use damage::DamageRegion;
pub use drop_zone::DropZone;
pub use plan::{ContentLookup, PlanItem, StackGeometry, StackPlan, transform_for};
