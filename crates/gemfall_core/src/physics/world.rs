//! Static collision world and the sphere-cast query seam
//!
//! The simulation integrates against whatever implements [`SphereCast`].
//! [`StaticCollisionWorld`] is the built-in implementation: a flat set of
//! layered static colliders checked exhaustively for the nearest hit. A
//! host engine with a broad phase can substitute its own caster.

use slotmap::{new_key_type, SlotMap};

use super::primitives::{BoundingSphere, Plane, SphereCastHit};
use crate::foundation::math::Vec3;

new_key_type! {
    /// Stable key for a collider registered with a [`StaticCollisionWorld`]
    pub struct ColliderKey;
}

/// Geometry of a static collider
#[derive(Debug, Clone, Copy)]
pub enum ColliderShape {
    /// An infinite plane
    Plane(Plane),
    /// A sphere volume
    Sphere(BoundingSphere),
}

/// A static collider: shape plus the collision layer it occupies
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    /// Collider geometry
    pub shape: ColliderShape,
    /// Collision layer bit(s) this collider occupies
    pub layer: u32,
}

/// Swept-sphere query capability
pub trait SphereCast {
    /// Sweep a sphere of `radius` from `origin` along `direction` (unit
    /// length) for at most `max_distance`, considering only colliders whose
    /// layer is in `mask`. Returns the nearest hit.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
    ) -> Option<SphereCastHit>;
}

/// A set of static colliders answering nearest-hit sphere casts
#[derive(Debug, Default)]
pub struct StaticCollisionWorld {
    colliders: SlotMap<ColliderKey, Collider>,
}

impl StaticCollisionWorld {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collider on the given layer
    pub fn add_collider(&mut self, shape: ColliderShape, layer: u32) -> ColliderKey {
        self.colliders.insert(Collider { shape, layer })
    }

    /// Remove a collider; returns false if the key is stale
    pub fn remove_collider(&mut self, key: ColliderKey) -> bool {
        self.colliders.remove(key).is_some()
    }

    /// Look up a collider by key
    pub fn collider(&self, key: ColliderKey) -> Option<&Collider> {
        self.colliders.get(key)
    }

    /// Number of registered colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the world has no colliders
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl SphereCast for StaticCollisionWorld {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
    ) -> Option<SphereCastHit> {
        let mut nearest: Option<SphereCastHit> = None;

        for collider in self.colliders.values() {
            if (collider.layer & mask) == 0 {
                continue;
            }

            let hit = match collider.shape {
                ColliderShape::Plane(plane) => {
                    plane.sweep_sphere(origin, radius, direction, max_distance)
                }
                ColliderShape::Sphere(sphere) => {
                    sphere.sweep_sphere(origin, radius, direction, max_distance)
                }
            };

            if let Some(hit) = hit {
                if nearest.map_or(true, |best| hit.distance < best.distance) {
                    nearest = Some(hit);
                }
            }
        }

        nearest
    }
}
