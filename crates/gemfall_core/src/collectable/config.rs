//! Collectable tuning parameters

use serde::{Deserialize, Serialize};

use crate::foundation::curve::{CurveKey, ResponseCurve};
use crate::foundation::range::ValueRange;
use crate::physics::CollisionLayers;

/// Tuning block shared by every instance of one collectable prototype
///
/// Immutable at runtime; instances hold it by shared reference. All fields
/// deserialize from TOML/RON config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectableConfig {
    // Simulation
    /// Radius of the swept collision sphere
    pub physical_radius: f32,

    /// Velocity scale applied on each bounce
    pub coeff_restitution: f32,

    /// Downward acceleration in units per second squared
    pub gravity: f32,

    /// Cap on the launch speed accepted from the spawner
    pub max_speed: f32,

    /// Speed below which the instance settles into rest
    pub rest_speed: f32,

    /// Collision layers the simulation collides with
    pub hit_mask: u32,

    // Collection
    /// Distance at which the target triggers collection
    pub collection_radius: f32,

    /// Delay after activation before proximity polling begins
    pub collection_delay: f32,

    /// Randomized duration of the homing flight
    pub collection_duration: ValueRange,

    /// Remaining-distance multiplier over normalized collection time; the
    /// instance is held at `curve(t) * start_distance` from the target,
    /// clamped so it never moves outward or past the target
    pub attraction_curve: ResponseCurve,

    /// Vertical arc multiplier over normalized collection time
    pub height_curve: ResponseCurve,

    /// Peak height of the collection arc above the start height
    pub max_height_offset: f32,
}

impl Default for CollectableConfig {
    fn default() -> Self {
        Self {
            physical_radius: 0.5,
            coeff_restitution: 0.5,
            gravity: 30.0,
            max_speed: 50.0,
            rest_speed: 0.1,
            hit_mask: CollisionLayers::ENVIRONMENT,
            collection_radius: 10.0,
            collection_delay: 1.0,
            collection_duration: ValueRange::new(0.5, 1.0),
            // Full start distance at t=0 closing to the target at t=1
            attraction_curve: ResponseCurve::linear(1.0, 0.0),
            // Rise to the full offset mid-flight, then come back down
            height_curve: ResponseCurve::from_keys(vec![
                CurveKey::new(0.0, 0.0),
                CurveKey::new(0.5, 1.0),
                CurveKey::new(1.0, 0.0),
            ]),
            max_height_offset: 5.0,
        }
    }
}
