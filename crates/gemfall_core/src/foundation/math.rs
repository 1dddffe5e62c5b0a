//! Math utilities and types
//!
//! Provides the fundamental math types for the 3D simulation.

use rand::Rng;

pub use nalgebra::{Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Position and orientation of a simulated instance
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Rng, Vec3};

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Reflect a vector about a surface normal (normal must be unit length)
    pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
        v - normal * (2.0 * v.dot(&normal))
    }

    /// Sample a uniformly distributed point on the unit sphere
    ///
    /// Marsaglia-style: uniform height plus uniform azimuth.
    pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
        let y = rng.gen_range(-1.0_f32..=1.0);
        let theta = rng.gen_range(0.0_f32..constants::TAU);
        let r = (1.0 - y * y).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), y, r * theta.sin())
    }

    /// Convert an HSV color (all components in [0, 1]) to RGB
    pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Vec3 {
        let h = (hue.fract() + 1.0).fract() * 6.0;
        let sector = h.floor();
        let f = h - sector;

        let p = value * (1.0 - saturation);
        let q = value * (1.0 - saturation * f);
        let t = value * (1.0 - saturation * (1.0 - f));

        match sector as i32 {
            0 => Vec3::new(value, t, p),
            1 => Vec3::new(q, value, p),
            2 => Vec3::new(p, value, t),
            3 => Vec3::new(p, q, value),
            4 => Vec3::new(t, p, value),
            _ => Vec3::new(value, p, q),
        }
    }
}
