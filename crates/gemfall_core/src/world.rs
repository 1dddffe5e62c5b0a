//! Frame driver wiring pools, scheduler, collision, and spawners
//!
//! [`GameWorld`] owns the simulation components and runs one frame per
//! [`step`](GameWorld::step): spawner updates, the proximity-poll pass over
//! every pool-active instance, the scheduler tick pass, and finally the
//! deferred pool releases queued during the frame. The host calls `step`
//! from its per-frame callback; everything runs on that single control
//! flow.

use crate::collectable::{Collectable, CollectableSpawner, TargetProvider, TickContext};
use crate::foundation::math::{Quat, Vec3};
use crate::physics::StaticCollisionWorld;
use crate::pool::{InstanceHandle, InstanceTemplate, PoolRegistry, PoolStats};
use crate::scheduler::ActiveSetScheduler;
use std::rc::Rc;

/// Owns and steps the collectable simulation
pub struct GameWorld {
    collision: StaticCollisionWorld,
    registry: PoolRegistry<Collectable>,
    scheduler: ActiveSetScheduler,
    spawners: Vec<CollectableSpawner>,
    /// Instances that asked to return to their pool this frame
    releases: Vec<InstanceHandle>,
    elapsed: f32,
}

impl GameWorld {
    /// Build a world from its collision geometry and pool registry
    pub fn new(collision: StaticCollisionWorld, registry: PoolRegistry<Collectable>) -> Self {
        Self {
            collision,
            registry,
            scheduler: ActiveSetScheduler::new(),
            spawners: Vec::new(),
            releases: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Add a spawner to run every frame
    pub fn add_spawner(&mut self, spawner: CollectableSpawner) {
        self.spawners.push(spawner);
    }

    /// Advance the simulation by one frame
    pub fn step(&mut self, dt: f32, target_provider: &dyn TargetProvider) {
        let target = target_provider.target_position();
        self.elapsed += dt;

        // Spawners first: new instances start ticking next pass
        {
            let collision = &self.collision;
            let registry = &mut self.registry;
            let scheduler = &mut self.scheduler;
            let releases = &mut self.releases;
            for spawner in &mut self.spawners {
                let mut ctx = TickContext {
                    caster: collision,
                    target,
                    scheduler: scheduler.ops_mut(),
                    releases: &mut *releases,
                };
                spawner.update(dt, registry, &mut ctx);
            }
        }

        // Proximity-poll pass over every pool-active instance; runs
        // independently of the tick scheduler so Resting instances are
        // still watched
        {
            let collision = &self.collision;
            let scheduler = &mut self.scheduler;
            let releases = &mut self.releases;
            self.registry.for_each_active_mut(|handle, collectable| {
                let mut ctx = TickContext {
                    caster: collision,
                    target,
                    scheduler: scheduler.ops_mut(),
                    releases: &mut *releases,
                };
                collectable.update_poll(handle, dt, &mut ctx);
            });
        }

        // Scheduler tick pass
        {
            let collision = &self.collision;
            let registry = &mut self.registry;
            let releases = &mut self.releases;
            self.scheduler.run_pass(dt, |handle, dt, ops| {
                match registry.get_mut(handle) {
                    Some(collectable) => {
                        let mut ctx = TickContext {
                            caster: collision,
                            target,
                            scheduler: ops,
                            releases: &mut *releases,
                        };
                        collectable.tick(handle, dt, &mut ctx);
                    }
                    // Instance vanished out-of-band; drop the registration
                    None => ops.unregister(handle),
                }
            });
        }

        // Deferred pool releases queued during the frame
        while let Some(handle) = self.releases.pop() {
            self.registry.release(handle);
        }
    }

    /// Spawn one instance outside any spawner cadence
    ///
    /// Returns `None` when the owning pool is exhausted.
    pub fn spawn_at(
        &mut self,
        template: &Rc<dyn InstanceTemplate<Collectable>>,
        position: Vec3,
        velocity: Vec3,
    ) -> Option<InstanceHandle> {
        let handle = self.registry.acquire(template, position, Quat::identity())?;

        let collectable = self.registry.get_mut(handle)?;
        collectable.set_initial_velocity(velocity);
        let mut ctx = TickContext {
            caster: &self.collision,
            target: None,
            scheduler: self.scheduler.ops_mut(),
            releases: &mut self.releases,
        };
        collectable.activate(handle, &mut ctx);

        Some(handle)
    }

    /// Deactivate an instance and return it to its pool
    ///
    /// Returns `false` when the handle is not live.
    pub fn despawn(&mut self, handle: InstanceHandle) -> bool {
        match self.registry.get_mut(handle) {
            Some(collectable) => {
                let mut ctx = TickContext {
                    caster: &self.collision,
                    target: None,
                    scheduler: self.scheduler.ops_mut(),
                    releases: &mut self.releases,
                };
                collectable.deactivate(handle, &mut ctx);
                self.registry.release(handle)
            }
            None => false,
        }
    }

    /// Recover pool bookkeeping after the host toggled visibility
    /// out-of-band
    pub fn rebuild_pools(&mut self) {
        self.registry.rebuild_all();
    }

    /// Collision geometry, for host setup
    pub fn collision_mut(&mut self) -> &mut StaticCollisionWorld {
        &mut self.collision
    }

    /// Read access to a live instance
    pub fn collectable(&self, handle: InstanceHandle) -> Option<&Collectable> {
        self.registry.get(handle)
    }

    /// Mutable access to a live instance
    pub fn collectable_mut(&mut self, handle: InstanceHandle) -> Option<&mut Collectable> {
        self.registry.get_mut(handle)
    }

    /// Pool registry, for direct host access
    pub fn registry(&self) -> &PoolRegistry<Collectable> {
        &self.registry
    }

    /// Mutable pool registry access
    pub fn registry_mut(&mut self) -> &mut PoolRegistry<Collectable> {
        &mut self.registry
    }

    /// Instances currently in use across all pools
    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    /// Instances currently registered for per-frame ticking
    pub fn ticking_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Aggregate pool statistics
    pub fn pool_stats(&self) -> PoolStats {
        self.registry.stats()
    }

    /// Simulated time advanced so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// A target provider with no target; collectables simulate but are never
/// collected
pub struct NoTarget;

impl TargetProvider for NoTarget {
    fn target_position(&self) -> Option<Vec3> {
        None
    }
}

/// A target pinned to a fixed position
pub struct FixedTarget(pub Vec3);

impl TargetProvider for FixedTarget {
    fn target_position(&self) -> Option<Vec3> {
        Some(self.0)
    }
}
