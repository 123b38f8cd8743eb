// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use core::fmt;

use crate::curve::Keypoints;

/// Immutable per-engine layout parameters.
///
/// The three curves describe how an item looks as it recedes behind the
/// frontmost slot; they are sampled at `0, 1/3, 2/3, 1` of
/// `item_depth * stack_depth`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Extent of one stack slot along the depth axis, in scroll units.
    pub item_depth: f64,
    /// Scale of a receding item.
    pub scaling: Keypoints,
    /// Vertical offset of a receding item, in layout units.
    pub spacing: Keypoints,
    /// Opacity of a receding item.
    pub alpha: Keypoints,
    /// How many items behind the frontmost one stay visible before they are
    /// fully faded.
    pub stack_depth: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::time_machine()
    }
}

impl LayoutConfig {
    /// The receding "time machine" stack: items shrink, rise, and fade over
    /// three slots.
    #[must_use]
    pub const fn time_machine() -> Self {
        Self {
            item_depth: 100.0,
            scaling: Keypoints::new([1.0, 0.92, 0.85, 0.8]),
            spacing: Keypoints::new([0.0, -24.0, -42.0, -56.0]),
            alpha: Keypoints::new([1.0, 0.6, 0.3, 0.0]),
            stack_depth: 3,
        }
    }

    /// A stack where receding items keep their size and position and only
    /// fade. Mostly useful for tests and debugging overlays.
    #[must_use]
    pub const fn flat() -> Self {
        Self {
            item_depth: 100.0,
            scaling: Keypoints::constant(1.0),
            spacing: Keypoints::constant(0.0),
            alpha: Keypoints::new([1.0, 2.0 / 3.0, 1.0 / 3.0, 0.0]),
            stack_depth: 3,
        }
    }

    /// Returns a copy with a different slot extent.
    #[must_use]
    pub const fn with_item_depth(mut self, item_depth: f64) -> Self {
        self.item_depth = item_depth;
        self
    }

    /// Returns a copy with a different visible stack depth.
    #[must_use]
    pub const fn with_stack_depth(mut self, stack_depth: u32) -> Self {
        self.stack_depth = stack_depth;
        self
    }

    /// Returns a copy with different receding curves.
    #[must_use]
    pub const fn with_curves(mut self, scaling: Keypoints, spacing: Keypoints, alpha: Keypoints) -> Self {
        self.scaling = scaling;
        self.spacing = spacing;
        self.alpha = alpha;
        self
    }

    /// Depth covered by the visible part of the stack behind the frontmost
    /// slot.
    #[inline]
    #[must_use]
    pub fn stack_extent(&self) -> f64 {
        self.item_depth * f64::from(self.stack_depth)
    }

    /// Checks that the configuration describes a usable stack.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.item_depth.is_finite() && self.item_depth > 0.0) {
            return Err(ConfigError::ItemDepth(self.item_depth));
        }
        if self.stack_depth == 0 {
            return Err(ConfigError::StackDepth);
        }
        let checks = [
            (Curve::Scaling, &self.scaling, 0.0, f64::INFINITY),
            (Curve::Spacing, &self.spacing, f64::NEG_INFINITY, f64::INFINITY),
            (Curve::Alpha, &self.alpha, 0.0, 1.0),
        ];
        for (curve, keypoints, lo, hi) in checks {
            for &value in &keypoints.values {
                if !value.is_finite() || value < lo || value > hi {
                    return Err(ConfigError::Keypoint { curve, value });
                }
            }
        }
        Ok(())
    }
}

/// Names one of the three receding curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    /// [`LayoutConfig::scaling`].
    Scaling,
    /// [`LayoutConfig::spacing`].
    Spacing,
    /// [`LayoutConfig::alpha`].
    Alpha,
}

/// A problem found by [`LayoutConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// `item_depth` is not a positive finite number.
    ItemDepth(f64),
    /// `stack_depth` is zero.
    StackDepth,
    /// A control value is outside the curve's allowed range (scale must be
    /// non-negative, opacity in `[0, 1]`, all finite).
    Keypoint {
        /// Curve holding the bad value.
        curve: Curve,
        /// The offending value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemDepth(depth) => write!(f, "item depth must be positive and finite, got {depth}"),
            Self::StackDepth => f.write_str("stack depth must be at least 1"),
            Self::Keypoint { curve, value } => {
                write!(f, "{curve:?} keypoint {value} is out of range")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert_eq!(LayoutConfig::time_machine().validate(), Ok(()));
        assert_eq!(LayoutConfig::flat().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_item_depth() {
        let config = LayoutConfig::flat().with_item_depth(0.0);
        assert_eq!(config.validate(), Err(ConfigError::ItemDepth(0.0)));
        let config = LayoutConfig::flat().with_item_depth(f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_stack_depth() {
        let config = LayoutConfig::flat().with_stack_depth(0);
        assert_eq!(config.validate(), Err(ConfigError::StackDepth));
    }

    #[test]
    fn rejects_out_of_range_opacity() {
        let mut config = LayoutConfig::flat();
        config.alpha = Keypoints::new([1.0, 1.2, 0.5, 0.0]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Keypoint {
                curve: Curve::Alpha,
                value: 1.2
            })
        );
    }

    #[test]
    fn negative_spacing_is_allowed() {
        let config = LayoutConfig::flat().with_curves(
            Keypoints::constant(1.0),
            Keypoints::new([0.0, -10.0, -20.0, -30.0]),
            Keypoints::constant(1.0),
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn stack_extent_spans_visible_slots() {
        let config = LayoutConfig::time_machine();
        assert!((config.stack_extent() - 300.0).abs() < 1e-9);
    }
}
