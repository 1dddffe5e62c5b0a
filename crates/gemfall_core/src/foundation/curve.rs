//! Keyframed response curves
//!
//! Designers author collection behaviour (closing speed, vertical arc) as
//! curves over normalized time. A `ResponseCurve` is an ordered list of
//! `(t, value)` keys evaluated with linear interpolation and clamped ends,
//! and deserializes straight out of config files.

use serde::{Deserialize, Serialize};

use super::math::utils::lerp;

/// A single curve keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Sample position, normally in [0, 1]
    pub t: f32,
    /// Curve value at `t`
    pub value: f32,
}

impl CurveKey {
    /// Create a new keyframe
    pub fn new(t: f32, value: f32) -> Self {
        Self { t, value }
    }
}

/// Piecewise-linear response curve
///
/// Keys are kept sorted by `t`. Evaluation clamps to the first/last key
/// outside the keyed range; an empty curve evaluates to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Build a curve from keyframes; keys are sorted by `t`
    pub fn from_keys(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { keys }
    }

    /// A curve that evaluates to `value` everywhere
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, value)],
        }
    }

    /// A straight line from `(0, start)` to `(1, end)`
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, start), CurveKey::new(1.0, end)],
        }
    }

    /// The curve's keyframes, sorted by `t`
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if t <= first.t {
            return first.value;
        }
        if t >= last.t {
            return last.value;
        }

        // t is strictly inside the keyed range, so a bracketing pair exists
        let upper = self
            .keys
            .iter()
            .position(|key| key.t >= t)
            .unwrap_or(self.keys.len() - 1);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];

        let span = b.t - a.t;
        if span <= f32::EPSILON {
            return b.value;
        }
        lerp(a.value, b.value, (t - a.t) / span)
    }
}

impl Default for ResponseCurve {
    /// Identity ramp: 0 at t=0 up to 1 at t=1
    fn default() -> Self {
        Self::linear(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_empty_curve_evaluates_to_zero() {
        let curve = ResponseCurve::from_keys(Vec::new());
        assert_relative_eq!(curve.evaluate(0.5), 0.0);
    }

    #[test]
    fn test_constant_curve() {
        let curve = ResponseCurve::constant(3.5);
        assert_relative_eq!(curve.evaluate(-1.0), 3.5);
        assert_relative_eq!(curve.evaluate(0.5), 3.5);
        assert_relative_eq!(curve.evaluate(2.0), 3.5);
    }

    #[test]
    fn test_linear_interpolation() {
        let curve = ResponseCurve::linear(0.0, 1.0);
        assert_relative_eq!(curve.evaluate(0.0), 0.0, epsilon = EPSILON);
        assert_relative_eq!(curve.evaluate(0.25), 0.25, epsilon = EPSILON);
        assert_relative_eq!(curve.evaluate(1.0), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_ends_are_clamped() {
        let curve = ResponseCurve::linear(2.0, 4.0);
        assert_relative_eq!(curve.evaluate(-10.0), 2.0);
        assert_relative_eq!(curve.evaluate(10.0), 4.0);
    }

    #[test]
    fn test_multi_segment_curve() {
        let curve = ResponseCurve::from_keys(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.5, 1.0),
            CurveKey::new(1.0, 0.0),
        ]);
        assert_relative_eq!(curve.evaluate(0.25), 0.5, epsilon = EPSILON);
        assert_relative_eq!(curve.evaluate(0.5), 1.0, epsilon = EPSILON);
        assert_relative_eq!(curve.evaluate(0.75), 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_keys_sorted_on_construction() {
        let curve = ResponseCurve::from_keys(vec![
            CurveKey::new(1.0, 10.0),
            CurveKey::new(0.0, 0.0),
        ]);
        assert_relative_eq!(curve.evaluate(0.5), 5.0, epsilon = EPSILON);
    }
}
