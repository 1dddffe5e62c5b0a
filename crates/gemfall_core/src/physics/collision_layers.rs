//! Collision layer system for filtering collision detection
//!
//! Every static collider carries a layer bit; simulated objects carry a
//! mask of the layers they collide with. Casts skip colliders whose layer
//! is not in the caster's mask.

/// Collision layer definitions using bit masks for efficient filtering
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Static environment geometry (ground, walls)
    pub const ENVIRONMENT: u32 = 1 << 0;

    /// Player character layer
    pub const PLAYER: u32 = 1 << 1;

    /// Pickups and collectables
    pub const PICKUP: u32 = 1 << 2;

    /// Movable props and debris
    pub const PROP: u32 = 1 << 3;

    /// Trigger volumes (no physical response)
    pub const TRIGGER: u32 = 1 << 4;

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }

    /// Check whether `layer` is part of `mask`
    pub fn contains(mask: u32, layer: u32) -> bool {
        (mask & layer) != 0
    }
}
