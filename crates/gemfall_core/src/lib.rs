//! # Gemfall Core
//!
//! Gameplay systems for a 3D action/collection game: a pooled collectable
//! simulation driven by a host engine's per-frame callback.
//!
//! ## Features
//!
//! - **Object pooling**: prototype-keyed pools with preallocation, capacity
//!   backpressure, and generation-counted handles
//! - **Collectable simulation**: gravity with sub-stepped swept-sphere
//!   collision response, rest detection, and curve-driven homing collection
//! - **Active-set scheduling**: deferred add/remove so registration during
//!   a tick never disturbs the pass in progress
//! - **Engine-agnostic**: collision queries go through a trait seam; the
//!   host supplies rendering, input, and the frame clock
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use gemfall_core::prelude::*;
//!
//! let mut collision = StaticCollisionWorld::new();
//! collision.add_collider(
//!     ColliderShape::Plane(Plane::horizontal(0.0)),
//!     CollisionLayers::ENVIRONMENT,
//! );
//!
//! let gem: Rc<dyn InstanceTemplate<Collectable>> = CollectablePrototype::new(
//!     PrototypeId(1),
//!     Rc::new(CollectableConfig::default()),
//! );
//! let registry = PoolRegistry::new(
//!     vec![StaticPoolSpec { template: Some(gem.clone()), min_objects: 64, max_objects: 256 }],
//!     0,
//!     -1,
//! );
//!
//! let mut world = GameWorld::new(collision, registry);
//! world.add_spawner(CollectableSpawner::new(
//!     gem,
//!     Vec3::new(0.0, 5.0, 0.0),
//!     SpawnerConfig::default(),
//! ));
//!
//! // Host frame loop
//! let player = FixedTarget(Vec3::zeros());
//! world.step(1.0 / 60.0, &player);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod collectable;
pub mod config;
pub mod foundation;
pub mod physics;
pub mod pool;
pub mod scheduler;
pub mod world;

pub use config::{Config, ConfigError};
pub use world::{FixedTarget, GameWorld, NoTarget};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        collectable::{
            Collectable, CollectableConfig, CollectablePrototype, CollectableSpawner,
            CollectableState, SpawnerConfig, TargetProvider, TickContext,
        },
        config::{Config, ConfigError},
        foundation::{
            curve::{CurveKey, ResponseCurve},
            math::{Quat, Transform, Vec3},
            range::ValueRange,
            time::Timer,
        },
        physics::{
            BoundingSphere, ColliderShape, CollisionLayers, Plane, SphereCast,
            StaticCollisionWorld,
        },
        pool::{
            InstanceHandle, InstanceTemplate, ObjectPool, PoolRegistry, PoolStats,
            PooledInstance, PrototypeId, StaticPoolSpec,
        },
        scheduler::{ActiveSetScheduler, SchedulerOps},
        world::{FixedTarget, GameWorld, NoTarget},
    };
}
