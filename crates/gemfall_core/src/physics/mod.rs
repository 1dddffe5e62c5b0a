//! Collision support for the collectable simulation
//!
//! The host runtime owns real physics; this module provides the minimal
//! static-geometry queries the simulation needs: layer-filtered swept-sphere
//! casts against planes and spheres.

pub mod collision_layers;
pub mod primitives;
pub mod world;

pub use collision_layers::CollisionLayers;
pub use primitives::{BoundingSphere, Plane, Ray, SphereCastHit};
pub use world::{Collider, ColliderKey, ColliderShape, SphereCast, StaticCollisionWorld};
