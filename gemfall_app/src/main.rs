//! Headless gemfall simulation demo
//!
//! Drives the collectable simulation without a host engine: a ground plane
//! with a couple of boulders, a spawner raining gems, and a target circling
//! the arena picking them up. Logs pool and scheduler statistics while it
//! runs. Configuration loads from `gemfall.toml` next to the binary,
//! falling back to defaults.

use serde::{Deserialize, Serialize};

use gemfall_core::prelude::*;
use std::rc::Rc;

/// Demo run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimConfig {
    /// Seconds of simulated time to run
    duration: f32,
    /// Fixed simulation timestep
    timestep: f32,
    /// Radius of the circle the target walks
    target_orbit_radius: f32,
    /// Angular speed of the target in radians per second
    target_orbit_speed: f32,
    /// Preallocated gems in the static pool
    pool_min_objects: usize,
    /// Concurrent gem cap (negative for unbounded)
    pool_max_objects: i32,
    /// Gem tuning
    collectable: CollectableConfig,
    /// Spawner cadence
    spawner: SpawnerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration: 30.0,
            timestep: 1.0 / 60.0,
            target_orbit_radius: 8.0,
            target_orbit_speed: 0.6,
            pool_min_objects: 64,
            pool_max_objects: 256,
            collectable: CollectableConfig::default(),
            spawner: SpawnerConfig {
                spawn_rate: 4.0,
                ..SpawnerConfig::default()
            },
        }
    }
}

impl Config for SimConfig {}

/// The player stand-in: walks a circle at ground level
struct OrbitingTarget {
    radius: f32,
    speed: f32,
    angle: f32,
}

impl OrbitingTarget {
    fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            angle: 0.0,
        }
    }

    fn update(&mut self, dt: f32) {
        self.angle += self.speed * dt;
    }
}

impl TargetProvider for OrbitingTarget {
    fn target_position(&self) -> Option<Vec3> {
        Some(Vec3::new(
            self.radius * self.angle.cos(),
            1.0,
            self.radius * self.angle.sin(),
        ))
    }
}

fn build_arena() -> StaticCollisionWorld {
    let mut collision = StaticCollisionWorld::new();
    collision.add_collider(
        ColliderShape::Plane(Plane::horizontal(0.0)),
        CollisionLayers::ENVIRONMENT,
    );
    collision.add_collider(
        ColliderShape::Sphere(BoundingSphere::new(Vec3::new(4.0, 0.0, 4.0), 2.0)),
        CollisionLayers::ENVIRONMENT,
    );
    collision.add_collider(
        ColliderShape::Sphere(BoundingSphere::new(Vec3::new(-5.0, 0.0, -3.0), 1.5)),
        CollisionLayers::ENVIRONMENT,
    );
    collision
}

fn main() {
    env_logger::init();

    let config = SimConfig::load_or_default("gemfall.toml");
    log::info!(
        "Starting headless sim: {}s at {}ms steps",
        config.duration,
        config.timestep * 1000.0
    );

    let gem: Rc<dyn InstanceTemplate<Collectable>> =
        CollectablePrototype::new(PrototypeId(1), Rc::new(config.collectable.clone()));
    let registry = PoolRegistry::new(
        vec![StaticPoolSpec {
            template: Some(gem.clone()),
            min_objects: config.pool_min_objects,
            max_objects: config.pool_max_objects,
        }],
        0,
        -1,
    );

    let mut world = GameWorld::new(build_arena(), registry);
    world.add_spawner(CollectableSpawner::new(
        gem,
        Vec3::new(0.0, 8.0, 0.0),
        config.spawner.clone(),
    ));

    let mut target = OrbitingTarget::new(config.target_orbit_radius, config.target_orbit_speed);
    let mut timer = Timer::new();
    let mut next_report = 1.0_f32;

    let frames = (config.duration / config.timestep).ceil() as u64;
    for _ in 0..frames {
        target.update(config.timestep);
        world.step(config.timestep, &target);
        timer.update();

        if world.elapsed() >= next_report {
            next_report += 1.0;
            let stats = world.pool_stats();
            log::info!(
                "t={:5.1}s active={:3} ticking={:3} collected={}",
                world.elapsed(),
                world.active_count(),
                world.ticking_count(),
                stats.total_released,
            );
        }
    }

    let stats = world.pool_stats();
    log::info!(
        "Done: {} frames in {:.2}s wall ({:.0} fps)",
        timer.frame_count(),
        timer.total_time(),
        timer.average_fps()
    );
    log::info!(
        "Pools: {} spawned, {} collected, peak {} concurrent, {} still active",
        stats.total_acquired,
        stats.total_released,
        stats.peak_active,
        stats.active
    );
}
