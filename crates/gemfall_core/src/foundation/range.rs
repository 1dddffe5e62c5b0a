//! Inclusive min/max value ranges with random sampling

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An inclusive `[min, max]` range of `f32` values
///
/// Used for designer-tuned randomized parameters such as the collection
/// duration and spawn launch speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound (inclusive)
    pub min: f32,
    /// Upper bound (inclusive)
    pub max: f32,
}

impl ValueRange {
    /// Create a new range; bounds are reordered if given backwards
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Draw a uniformly distributed sample from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max - self.min <= f32::EPSILON {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    /// Midpoint of the range
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}
