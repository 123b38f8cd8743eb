// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! [`DepthStack`](crate::DepthStack) tracks which global ranks need work in
//! the next [`evaluate`](crate::DepthStack::evaluate) pass with a
//! [`understory_dirty`] tracker keyed by rank. Ranks have no dependency edges
//! on each other, so every channel is local-only.
//!
//! - [`ATTRIBUTES`] is marked for every rank inside the visible window of
//!   the new depth position. Draining it recomputes their attributes and
//!   reports them as shown or updated.
//! - [`VISIBILITY`] is marked for every rank that was visible after the last
//!   pass. Draining it hides the ones that fell out of the window.
//!
//! A rebuild of the sort index replaces the tracker wholesale, since ranks
//! are reassigned.

use understory_dirty::Channel;

/// Attributes must be recomputed at the new depth position.
pub const ATTRIBUTES: Channel = Channel::new(0);

/// Visibility may have changed; culled ranks are hidden on drain.
pub const VISIBILITY: Channel = Channel::new(1);
