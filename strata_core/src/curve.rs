// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Piecewise-linear keypoint curves.
//!
//! A [`Keypoints`] curve holds evenly spaced control values. Sample `i` of `n`
//! sits at normalized distance `i / (n - 1)`, so the default four-sample
//! curves are sampled at 0, 1/3, 2/3, and 1 slot-fractions behind the
//! frontmost item.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Number of control values in a [`Keypoints`] curve.
pub const KEYPOINT_COUNT: usize = 4;

/// An evenly spaced piecewise-linear curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoints {
    /// Control values, first at distance 0, last at distance 1.
    pub values: [f64; KEYPOINT_COUNT],
}

impl Keypoints {
    /// Creates a curve from its control values.
    #[inline]
    #[must_use]
    pub const fn new(values: [f64; KEYPOINT_COUNT]) -> Self {
        Self { values }
    }

    /// A curve that returns `value` everywhere.
    #[inline]
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self {
            values: [value; KEYPOINT_COUNT],
        }
    }

    /// Samples the curve at `t`, clamped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn sample(&self, t: f64) -> f64 {
        interpolate(t, &self.values)
    }

    /// Smallest control value.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest control value.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Piecewise-linear interpolation across `keypoints`.
///
/// `t` is clamped to `[0, 1]` (NaN reads as 0) and mapped to the fractional
/// index `t * (len - 1)`. An empty slice samples as 0.
#[must_use]
pub fn interpolate(t: f64, keypoints: &[f64]) -> f64 {
    let Some((&last, _)) = keypoints.split_last() else {
        return 0.0;
    };
    if keypoints.len() == 1 {
        return last;
    }
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let span = (keypoints.len() - 1) as f64;
    let pos = t * span;
    let lower = pos.floor();
    #[expect(
        clippy::cast_possible_truncation,
        reason = "pos is clamped to [0, len - 1], so the floor fits in usize"
    )]
    let i = lower as usize;
    if i + 1 >= keypoints.len() {
        return last;
    }
    let frac = pos - lower;
    let a = keypoints[i];
    let b = keypoints[i + 1];
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn endpoints_hit_first_and_last_values() {
        let k = [1.0, 0.8, 0.6, 0.2];
        assert!(close(interpolate(0.0, &k), 1.0));
        assert!(close(interpolate(1.0, &k), 0.2));
    }

    #[test]
    fn samples_at_thirds_hit_control_values() {
        let k = [1.0, 0.8, 0.6, 0.2];
        assert!(close(interpolate(1.0 / 3.0, &k), 0.8));
        assert!(close(interpolate(2.0 / 3.0, &k), 0.6));
    }

    #[test]
    fn midpoints_are_linear() {
        let k = [0.0, 3.0, 6.0, 9.0];
        assert!(close(interpolate(0.5, &k), 4.5));
        assert!(close(interpolate(1.0 / 6.0, &k), 1.5));
    }

    #[test]
    fn out_of_range_t_is_clamped() {
        let k = [1.0, 0.5, 0.25, 0.0];
        assert!(close(interpolate(-3.0, &k), 1.0));
        assert!(close(interpolate(7.0, &k), 0.0));
        assert!(close(interpolate(f64::NAN, &k), 1.0));
    }

    #[test]
    fn degenerate_slices() {
        assert!(close(interpolate(0.5, &[]), 0.0));
        assert!(close(interpolate(0.5, &[4.0]), 4.0));
        assert!(close(interpolate(0.5, &[0.0, 2.0]), 1.0));
    }

    #[test]
    fn keypoints_min_max() {
        let k = Keypoints::new([0.5, -2.0, 3.0, 1.0]);
        assert!(close(k.min(), -2.0));
        assert!(close(k.max(), 3.0));
        assert!(close(Keypoints::constant(7.0).sample(0.3), 7.0));
    }
}
