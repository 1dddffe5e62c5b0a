//! The collectable state machine
//!
//! Lifecycle: `Uninitialised → Simulating → Resting`, and from either live
//! state `→ Collecting → Collected`, at which point the instance returns to
//! its pool. While Simulating the entity integrates gravity with sub-stepped
//! swept-sphere collision response; while Collecting it homes in on the
//! target along the configured curves.
//!
//! Collaborators are injected per call through [`TickContext`]; mutations
//! that would touch a collaborator mid-iteration (scheduler registration,
//! pool release) are pushed onto the context's deferred queues and applied
//! by the driver after the pass.

use std::rc::Rc;

use rand::Rng;

use super::config::CollectableConfig;
use crate::foundation::math::{utils, Quat, Transform, Vec3};
use crate::physics::world::SphereCast;
use crate::pool::{InstanceHandle, PooledInstance};
use crate::scheduler::SchedulerOps;

/// Interval between proximity polls once the initial delay elapses
pub const POLL_INTERVAL: f32 = 0.5;

/// Smallest time slice the collision integration will sub-step
const TIME_EPSILON: f32 = 1e-4;

/// Lifecycle states of a collectable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectableState {
    /// Pooled or freshly acquired; not simulating
    Uninitialised,
    /// Physically simulating (bouncing, rolling)
    Simulating,
    /// Settled; no motion integration, proximity polling continues
    Resting,
    /// Homing in on the target
    Collecting,
    /// Finished; released back to the pool
    Collected,
}

impl CollectableState {
    /// Whether proximity polling may promote this state into collection
    pub fn can_be_collected(self) -> bool {
        matches!(self, Self::Simulating | Self::Resting)
    }

    /// Whether this state requires per-frame ticking
    pub fn needs_tick(self) -> bool {
        matches!(self, Self::Simulating | Self::Collecting)
    }
}

/// Per-call collaborators for the collectable
pub struct TickContext<'a> {
    /// Collision query the simulation integrates against
    pub caster: &'a dyn SphereCast,

    /// Current target (player) position, if a target exists
    pub target: Option<Vec3>,

    /// Deferred scheduler registration traffic
    pub scheduler: &'a mut SchedulerOps,

    /// Deferred pool-release queue, drained by the driver after the pass
    pub releases: &'a mut Vec<InstanceHandle>,
}

/// A pooled, physically simulated, collectable instance
pub struct Collectable {
    config: Rc<CollectableConfig>,
    transform: Transform,
    velocity: Vec3,
    state: CollectableState,
    /// Elapsed time in the current state
    state_time: f32,
    /// Countdown to the next proximity poll; `None` while polling is off
    next_poll_in: Option<f32>,
    /// Distance to the target captured at Collecting entry
    collection_distance: f32,
    /// Height captured at Collecting entry
    collection_height: f32,
    /// Duration sampled at Collecting entry
    collection_duration: f32,
    tint: Vec3,
    visible: bool,
}

impl Collectable {
    /// Construct an instance sharing the given config
    pub fn new(config: Rc<CollectableConfig>) -> Self {
        Self {
            config,
            transform: Transform::identity(),
            velocity: Vec3::zeros(),
            state: CollectableState::Uninitialised,
            state_time: 0.0,
            next_poll_in: None,
            collection_distance: 0.0,
            collection_height: 0.0,
            collection_duration: 0.0,
            tint: Vec3::new(1.0, 1.0, 1.0),
            visible: false,
        }
    }

    /// Current state
    pub fn state(&self) -> CollectableState {
        self.state
    }

    /// Elapsed time in the current state
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    /// Current position and orientation
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Current world position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Render tint randomized at activation
    pub fn tint(&self) -> Vec3 {
        self.tint
    }

    /// Shared tuning block
    pub fn config(&self) -> &CollectableConfig {
        &self.config
    }

    /// Host-side visibility override; pool [`rebuild`] reclassifies by this
    ///
    /// [`rebuild`]: crate::pool::ObjectPool::rebuild
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Set the launch velocity; called once by the spawner right after
    /// acquisition. The magnitude is capped at the configured `max_speed`.
    pub fn set_initial_velocity(&mut self, velocity: Vec3) {
        let speed = velocity.magnitude();
        self.velocity = if speed > self.config.max_speed {
            velocity * (self.config.max_speed / speed)
        } else {
            velocity
        };
    }

    /// Begin simulating: randomize the tint, enter Simulating (registering
    /// with the scheduler), and arm the first proximity poll after the
    /// configured delay
    pub fn activate(&mut self, handle: InstanceHandle, ctx: &mut TickContext<'_>) {
        let mut rng = rand::thread_rng();
        self.tint = utils::hsv_to_rgb(rng.gen::<f32>(), rng.gen_range(0.8..=1.0), 1.0);

        self.set_state(CollectableState::Simulating, handle, ctx);
        self.next_poll_in = Some(self.config.collection_delay);
    }

    /// Stop simulating: unregister and cancel polling
    ///
    /// Idempotent; safe to call in any state.
    pub fn deactivate(&mut self, handle: InstanceHandle, ctx: &mut TickContext<'_>) {
        self.set_state(CollectableState::Uninitialised, handle, ctx);
        self.next_poll_in = None;
    }

    /// Advance the proximity-poll timer; called once per frame for every
    /// pool-active instance, independent of the tick scheduler
    pub fn update_poll(&mut self, handle: InstanceHandle, dt: f32, ctx: &mut TickContext<'_>) {
        let Some(next_poll_in) = self.next_poll_in.as_mut() else {
            return;
        };

        *next_poll_in -= dt;
        if *next_poll_in > 0.0 {
            return;
        }
        *next_poll_in = POLL_INTERVAL;

        if !self.state.can_be_collected() {
            return;
        }
        let Some(target) = ctx.target else {
            return;
        };

        let to_target = target - self.transform.position;
        let radius = self.config.collection_radius;
        if to_target.magnitude_squared() < radius * radius {
            self.set_state(CollectableState::Collecting, handle, ctx);
        }
    }

    /// Advance the simulation by one frame; invoked by the scheduler only
    /// while registered
    pub fn tick(&mut self, handle: InstanceHandle, dt: f32, ctx: &mut TickContext<'_>) {
        self.state_time += dt;

        match self.state {
            CollectableState::Simulating => self.perform_move(handle, dt, ctx),
            CollectableState::Collecting => self.track_target(handle, ctx),
            _ => {}
        }
    }

    /// Switch states, running entry side effects
    fn set_state(
        &mut self,
        new_state: CollectableState,
        handle: InstanceHandle,
        ctx: &mut TickContext<'_>,
    ) {
        if new_state == self.state {
            return;
        }

        self.state_time = 0.0;
        let mut is_active = false;
        match new_state {
            CollectableState::Uninitialised | CollectableState::Resting => {}
            CollectableState::Simulating => {
                is_active = true;
            }
            CollectableState::Collecting => {
                is_active = true;
                self.collection_distance = ctx
                    .target
                    .map_or(0.0, |target| (target - self.transform.position).magnitude());
                self.collection_height = self.transform.position.y;
                let mut rng = rand::thread_rng();
                self.collection_duration = self.config.collection_duration.sample(&mut rng);
            }
            CollectableState::Collected => {
                ctx.releases.push(handle);
            }
        }

        if is_active {
            ctx.scheduler.register(handle);
        } else {
            ctx.scheduler.unregister(handle);
        }

        self.state = new_state;
    }

    /// Gravity plus sub-stepped swept-sphere integration
    ///
    /// Each sub-step casts along the current velocity for the remaining
    /// time slice; hits consume the traveled fraction and reflect the
    /// velocity about the surface normal scaled by restitution, so a fast
    /// instance can bounce several times within a single frame.
    fn perform_move(&mut self, handle: InstanceHandle, dt: f32, ctx: &mut TickContext<'_>) {
        self.velocity.y -= self.config.gravity * dt;

        let mut position = self.transform.position;
        let mut time_to_travel = dt;
        while time_to_travel > TIME_EPSILON {
            let speed = self.velocity.magnitude();

            if speed < self.config.rest_speed {
                self.set_state(CollectableState::Resting, handle, ctx);
                break;
            }

            let distance = speed * time_to_travel;
            let direction = self.velocity / speed;
            match ctx.caster.sphere_cast(
                position,
                self.config.physical_radius,
                direction,
                distance,
                self.config.hit_mask,
            ) {
                Some(hit) => {
                    let time_traveled = hit.distance / speed;
                    time_to_travel -= time_traveled;
                    position += self.velocity * time_traveled;
                    if direction.dot(&hit.normal) < 0.0 {
                        self.velocity = utils::reflect(self.velocity, hit.normal)
                            * self.config.coeff_restitution;
                    }
                }
                None => {
                    position += self.velocity * time_to_travel;
                    break;
                }
            }
        }
        self.transform.position = position;
    }

    /// Homing flight toward the target
    ///
    /// The instance is placed at `attraction_curve(t) * start_distance`
    /// from the target along the current approach direction, clamped to the
    /// actual remaining distance so it never moves outward or past the
    /// target; height follows the captured start height plus the arc curve,
    /// independent of the closing distance.
    fn track_target(&mut self, handle: InstanceHandle, ctx: &mut TickContext<'_>) {
        if let Some(target) = ctx.target {
            if self.state_time < self.collection_duration {
                let t = self.state_time / self.collection_duration;

                let to_target = target - self.transform.position;
                let distance = to_target.magnitude();
                let desired = self.config.attraction_curve.evaluate(t) * self.collection_distance;
                let step = distance.min(desired);

                let mut position = if distance > 1e-6 {
                    target - (to_target / distance) * step
                } else {
                    target
                };
                position.y = self.collection_height
                    + self.config.height_curve.evaluate(t) * self.config.max_height_offset;

                self.transform.position = position;
                return;
            }
        }

        // Duration elapsed or target lost: either way the flight is over
        self.set_state(CollectableState::Collected, handle, ctx);
    }
}

impl PooledInstance for Collectable {
    fn on_acquire(&mut self, position: Vec3, rotation: Quat) {
        self.transform = Transform::from_position_rotation(position, rotation);
        self.velocity = Vec3::zeros();
        self.state = CollectableState::Uninitialised;
        self.state_time = 0.0;
        self.next_poll_in = None;
        self.visible = true;
    }

    fn on_release(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::curve::ResponseCurve;
    use crate::foundation::range::ValueRange;
    use crate::physics::{ColliderShape, CollisionLayers, Plane, StaticCollisionWorld};
    use crate::pool::PrototypeId;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn handle() -> InstanceHandle {
        InstanceHandle {
            prototype: PrototypeId(1),
            index: 0,
            generation: 1,
        }
    }

    fn ground_world() -> StaticCollisionWorld {
        let mut world = StaticCollisionWorld::new();
        world.add_collider(
            ColliderShape::Plane(Plane::horizontal(0.0)),
            CollisionLayers::ENVIRONMENT,
        );
        world
    }

    fn collectable(config: CollectableConfig, position: Vec3) -> Collectable {
        let mut c = Collectable::new(Rc::new(config));
        c.on_acquire(position, Quat::identity());
        c
    }

    #[test]
    fn test_single_bounce_reflects_and_scales_velocity() {
        let config = CollectableConfig {
            gravity: 0.0,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: None,
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::new(0.0, 1.0, 0.0));
        c.activate(handle(), &mut ctx);
        c.set_initial_velocity(Vec3::new(0.0, -20.0, 0.0));
        c.tick(handle(), 0.1, &mut ctx);

        // Contact after 0.5 units of travel (0.025s); restitution halves the
        // reflected speed; the remaining 0.075s is spent rising at 10/s
        assert_relative_eq!(c.velocity(), Vec3::new(0.0, 10.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(c.position().y, 0.5 + 10.0 * 0.075, epsilon = EPSILON);
        assert_eq!(c.state(), CollectableState::Simulating);
    }

    #[test]
    fn test_initial_velocity_is_capped_at_max_speed() {
        let config = CollectableConfig {
            max_speed: 10.0,
            ..CollectableConfig::default()
        };
        let mut c = collectable(config, Vec3::zeros());

        c.set_initial_velocity(Vec3::new(0.0, 0.0, 100.0));
        assert_relative_eq!(c.velocity().magnitude(), 10.0, epsilon = EPSILON);

        c.set_initial_velocity(Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(c.velocity().magnitude(), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_slow_entity_rests_within_the_same_step() {
        let config = CollectableConfig {
            gravity: 0.0,
            rest_speed: 0.1,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: None,
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::new(0.0, 1.0, 0.0));
        c.activate(handle(), &mut ctx);
        c.set_initial_velocity(Vec3::new(0.05, 0.0, 0.0));
        c.tick(handle(), 0.1, &mut ctx);

        assert_eq!(c.state(), CollectableState::Resting);
        // No integration happens once at rest
        assert_relative_eq!(c.position(), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_freefall_never_rests() {
        // Preserved from the source behaviour: with gravity active the
        // speed only grows in open air, so the rest threshold is never met
        let config = CollectableConfig::default();
        let world = StaticCollisionWorld::new();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: None,
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::new(0.0, 100.0, 0.0));
        c.activate(handle(), &mut ctx);
        c.set_initial_velocity(Vec3::new(0.0, -0.05, 0.0));
        for _ in 0..20 {
            c.tick(handle(), 0.05, &mut ctx);
        }

        assert_eq!(c.state(), CollectableState::Simulating);
    }

    #[test]
    fn test_poll_waits_for_initial_delay() {
        let config = CollectableConfig {
            collection_delay: 1.0,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(Vec3::zeros()),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::new(1.0, 0.5, 0.0));
        c.activate(handle(), &mut ctx);

        // Within the delay: target in range but no promotion yet
        c.update_poll(handle(), 0.5, &mut ctx);
        assert_eq!(c.state(), CollectableState::Simulating);

        c.update_poll(handle(), 0.6, &mut ctx);
        assert_eq!(c.state(), CollectableState::Collecting);
    }

    #[test]
    fn test_poll_ignores_target_outside_radius() {
        let config = CollectableConfig {
            collection_delay: 0.0,
            collection_radius: 2.0,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(Vec3::new(10.0, 0.0, 0.0)),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        c.update_poll(handle(), 0.1, &mut ctx);

        assert_eq!(c.state(), CollectableState::Simulating);
    }

    #[test]
    fn test_attraction_approaches_without_overshoot() {
        let config = CollectableConfig {
            collection_delay: 0.0,
            collection_duration: ValueRange::new(1.0, 1.0),
            attraction_curve: ResponseCurve::linear(1.0, 0.0),
            height_curve: ResponseCurve::constant(0.0),
            max_height_offset: 0.0,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let target = Vec3::new(5.0, 0.0, 0.0);
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(target),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        c.update_poll(handle(), 0.1, &mut ctx);
        assert_eq!(c.state(), CollectableState::Collecting);

        // The x coordinate closes on the target monotonically and never
        // passes it
        let mut last_x = c.position().x;
        for _ in 0..9 {
            c.tick(handle(), 0.1, &mut ctx);
            let x = c.position().x;
            assert!(x >= last_x - EPSILON);
            assert!(x <= target.x + EPSILON);
            last_x = x;
        }
        // Held at curve(t) * start_distance from the target: t=0.9 -> 0.5
        assert_relative_eq!(last_x, 4.5, epsilon = 1e-3);
    }

    #[test]
    fn test_attraction_clamps_to_remaining_distance() {
        // A curve demanding more remaining distance than exists must not
        // push the instance outward
        let config = CollectableConfig {
            collection_delay: 0.0,
            collection_duration: ValueRange::new(1.0, 1.0),
            attraction_curve: ResponseCurve::constant(50.0),
            height_curve: ResponseCurve::constant(0.0),
            max_height_offset: 0.0,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let target = Vec3::new(5.0, 0.0, 0.0);
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(target),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        c.update_poll(handle(), 0.1, &mut ctx);

        c.tick(handle(), 0.1, &mut ctx);
        // Clamped to the current distance: the planar position holds
        assert_relative_eq!(c.position().x, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_collection_arc_follows_height_curve() {
        let config = CollectableConfig {
            collection_delay: 0.0,
            collection_duration: ValueRange::new(1.0, 1.0),
            attraction_curve: ResponseCurve::linear(0.0, 1.0),
            height_curve: ResponseCurve::constant(1.0),
            max_height_offset: 3.0,
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(Vec3::new(5.0, 0.0, 0.0)),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::new(0.0, 2.0, 0.0));
        c.activate(handle(), &mut ctx);
        c.update_poll(handle(), 0.1, &mut ctx);

        c.tick(handle(), 0.5, &mut ctx);
        // Height is start height plus curve * offset, not distance-driven
        assert_relative_eq!(c.position().y, 2.0 + 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_collection_completes_after_duration() {
        let config = CollectableConfig {
            collection_delay: 0.0,
            collection_duration: ValueRange::new(0.5, 0.5),
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(Vec3::new(1.0, 0.0, 0.0)),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        c.update_poll(handle(), 0.1, &mut ctx);

        c.tick(handle(), 0.3, &mut ctx);
        assert_eq!(c.state(), CollectableState::Collecting);
        c.tick(handle(), 0.3, &mut ctx);

        assert_eq!(c.state(), CollectableState::Collected);
        assert_eq!(ctx.releases.as_slice(), &[handle()]);
    }

    #[test]
    fn test_lost_target_ends_collection() {
        let config = CollectableConfig {
            collection_delay: 0.0,
            collection_duration: ValueRange::new(10.0, 10.0),
            ..CollectableConfig::default()
        };
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: Some(Vec3::new(1.0, 0.0, 0.0)),
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        c.update_poll(handle(), 0.1, &mut ctx);
        assert_eq!(c.state(), CollectableState::Collecting);

        ctx.target = None;
        c.tick(handle(), 0.1, &mut ctx);

        assert_eq!(c.state(), CollectableState::Collected);
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let config = CollectableConfig::default();
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: None,
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        c.deactivate(handle(), &mut ctx);
        c.deactivate(handle(), &mut ctx);

        assert_eq!(c.state(), CollectableState::Uninitialised);
        // Polling is cancelled: a due poll does nothing
        ctx.target = Some(Vec3::zeros());
        c.update_poll(handle(), 10.0, &mut ctx);
        assert_eq!(c.state(), CollectableState::Uninitialised);
    }

    #[test]
    fn test_activation_randomizes_tint() {
        let config = CollectableConfig::default();
        let world = ground_world();
        let mut ops = SchedulerOps::default();
        let mut releases = Vec::new();
        let mut ctx = TickContext {
            caster: &world,
            target: None,
            scheduler: &mut ops,
            releases: &mut releases,
        };

        let mut c = collectable(config, Vec3::zeros());
        c.activate(handle(), &mut ctx);
        let tint = c.tint();

        // Saturation is at least 0.8, so the channels cannot all be equal
        let max = tint.x.max(tint.y).max(tint.z);
        let min = tint.x.min(tint.y).min(tint.z);
        assert!(max > min);
        assert_relative_eq!(max, 1.0, epsilon = 1e-5);
    }
}
