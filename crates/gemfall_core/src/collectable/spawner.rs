//! Periodic and burst spawning of collectables
//!
//! A thin caller of the pool contract: on its configured cadence it asks
//! the registry for an instance, launches it with a random velocity, and
//! activates it. Pool exhaustion means the spawn is skipped, never an
//! error.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::entity::{Collectable, TickContext};
use crate::foundation::math::{utils, Quat, Vec3};
use crate::foundation::range::ValueRange;
use crate::pool::{InstanceTemplate, PoolRegistry};

/// A burst of spawns at a fixed point within the burst period
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BurstSpawn {
    /// Offset into the burst period, in seconds
    pub time: f32,
    /// Number of instances to spawn
    pub count: u32,
}

/// Spawner cadence parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Steady spawns per second; zero or negative disables steady spawning
    pub spawn_rate: f32,

    /// Length of the repeating burst window; zero or negative disables
    /// bursts
    pub burst_period: f32,

    /// Bursts fired when the window crosses their offsets
    pub bursts: Vec<BurstSpawn>,

    /// Launch speed range for freshly spawned instances
    pub launch_speed: ValueRange,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 1.0,
            burst_period: 0.0,
            bursts: Vec::new(),
            launch_speed: ValueRange::new(10.0, 30.0),
        }
    }
}

/// Spawns collectables of one prototype from a fixed position
pub struct CollectableSpawner {
    template: Rc<dyn InstanceTemplate<Collectable>>,
    position: Vec3,
    config: SpawnerConfig,
    burst_tick: f32,
    tick: f32,
}

impl CollectableSpawner {
    /// Create a spawner for the given prototype at a world position
    pub fn new(
        template: Rc<dyn InstanceTemplate<Collectable>>,
        position: Vec3,
        config: SpawnerConfig,
    ) -> Self {
        Self {
            template,
            position,
            config,
            burst_tick: 0.0,
            tick: 0.0,
        }
    }

    /// Where this spawner releases instances
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Advance the spawner by one frame; returns the number of instances
    /// spawned
    pub fn update(
        &mut self,
        dt: f32,
        registry: &mut PoolRegistry<Collectable>,
        ctx: &mut TickContext<'_>,
    ) -> usize {
        let mut spawned = 0;

        if self.config.burst_period > 0.0 {
            if self.burst_tick + dt > self.config.burst_period {
                self.burst_tick -= self.config.burst_period;
            }
            // Collect due bursts first so do_spawn can borrow self freely
            let mut due = 0;
            for burst in &self.config.bursts {
                if self.burst_tick <= burst.time && self.burst_tick + dt > burst.time {
                    due += burst.count;
                }
            }
            for _ in 0..due {
                if self.do_spawn(registry, ctx) {
                    spawned += 1;
                }
            }
            self.burst_tick += dt;
        }

        self.tick += dt;

        if self.config.spawn_rate > 0.0 {
            let interval = 1.0 / self.config.spawn_rate;
            while self.tick > interval {
                self.tick -= interval;
                if self.do_spawn(registry, ctx) {
                    spawned += 1;
                }
            }
        }

        spawned
    }

    /// Acquire, launch, and activate one instance
    fn do_spawn(
        &self,
        registry: &mut PoolRegistry<Collectable>,
        ctx: &mut TickContext<'_>,
    ) -> bool {
        let Some(handle) = registry.acquire(&self.template, self.position, Quat::identity())
        else {
            log::debug!("Spawn skipped: pool exhausted for {}", self.template.id());
            return false;
        };

        let mut rng = rand::thread_rng();
        let velocity =
            utils::random_unit_vector(&mut rng) * self.config.launch_speed.sample(&mut rng);

        if let Some(collectable) = registry.get_mut(handle) {
            collectable.set_initial_velocity(velocity);
            collectable.activate(handle, ctx);
        }
        true
    }
}
