//! Collectable simulation: configuration, state machine, and spawning
//!
//! A collectable is a pooled instance that physically simulates (bounces,
//! rolls, settles), watches for the collection target to come near, homes
//! in along designer-authored curves, and hands itself back to its pool.

pub mod config;
pub mod entity;
pub mod spawner;

use std::rc::Rc;

use crate::foundation::math::Vec3;
use crate::pool::{InstanceTemplate, PrototypeId};

pub use config::CollectableConfig;
pub use entity::{Collectable, CollectableState, TickContext, POLL_INTERVAL};
pub use spawner::{BurstSpawn, CollectableSpawner, SpawnerConfig};

/// The single capability the player system exposes to collectables
///
/// Queried by position only; no other coupling to the locomotion layer.
pub trait TargetProvider {
    /// Current world position of the collection target, if one exists
    fn target_position(&self) -> Option<Vec3>;
}

/// Pool template for collectables sharing one config
pub struct CollectablePrototype {
    id: PrototypeId,
    config: Rc<CollectableConfig>,
}

impl CollectablePrototype {
    /// Create a prototype binding an identity to a shared config
    pub fn new(id: PrototypeId, config: Rc<CollectableConfig>) -> Rc<Self> {
        Rc::new(Self { id, config })
    }

    /// The shared config new instances are built with
    pub fn config(&self) -> &Rc<CollectableConfig> {
        &self.config
    }
}

impl InstanceTemplate<Collectable> for CollectablePrototype {
    fn id(&self) -> PrototypeId {
        self.id
    }

    fn instantiate(&self) -> Collectable {
        Collectable::new(self.config.clone())
    }
}
