//! Prototype-keyed pool routing
//!
//! The registry owns one [`ObjectPool`] per distinct prototype. Pools come
//! from two places: a pre-declared static set with explicit capacities,
//! validated at construction, and dynamic pools created lazily with the
//! registry-wide default capacity the first time an unseen prototype is
//! acquired. The registry is a plainly owned component handed by reference
//! to whoever needs it; it holds no global state.

use std::collections::HashMap;
use std::rc::Rc;

use super::{InstanceHandle, InstanceTemplate, ObjectPool, PoolStats, PooledInstance, PrototypeId};
use crate::foundation::math::{Quat, Vec3};

/// Declaration of a pre-registered pool
pub struct StaticPoolSpec<T> {
    /// Template the pool instantiates from; `None` is a configuration
    /// error (logged and skipped at registry construction)
    pub template: Option<Rc<dyn InstanceTemplate<T>>>,
    /// Instances preallocated up front
    pub min_objects: usize,
    /// Maximum concurrent actives; negative means unbounded
    pub max_objects: i32,
}

/// Routes acquire/release requests to the pool owning each prototype
pub struct PoolRegistry<T> {
    pools: HashMap<PrototypeId, ObjectPool<T>>,
    dynamic_min_objects: usize,
    dynamic_max_objects: i32,
}

impl<T: PooledInstance> PoolRegistry<T> {
    /// Build a registry from the static pool set plus the default capacity
    /// policy for dynamically created pools
    pub fn new(
        static_pools: Vec<StaticPoolSpec<T>>,
        dynamic_min_objects: usize,
        dynamic_max_objects: i32,
    ) -> Self {
        let mut pools = HashMap::new();

        for (slot, spec) in static_pools.into_iter().enumerate() {
            let Some(template) = spec.template else {
                log::warn!("Static pool {} has no template defined", slot);
                continue;
            };

            let id = template.id();
            if pools.contains_key(&id) {
                log::warn!("Static pool {} duplicates prototype {}", slot, id);
                continue;
            }

            let mut pool = ObjectPool::new(Some(template), spec.max_objects);
            pool.initialize(spec.min_objects);
            pools.insert(id, pool);
        }

        Self {
            pools,
            dynamic_min_objects,
            dynamic_max_objects,
        }
    }

    /// Acquire an instance of the given prototype, creating a dynamic pool
    /// for templates never seen before
    ///
    /// Returns `None` when the owning pool is exhausted.
    pub fn acquire(
        &mut self,
        template: &Rc<dyn InstanceTemplate<T>>,
        position: Vec3,
        rotation: Quat,
    ) -> Option<InstanceHandle> {
        let id = template.id();
        let pool = self.pools.entry(id).or_insert_with(|| {
            log::info!("Creating dynamic pool for prototype {}", id);
            let mut pool = ObjectPool::new(Some(template.clone()), self.dynamic_max_objects);
            pool.initialize(self.dynamic_min_objects);
            pool
        });

        pool.acquire(position, rotation)
    }

    /// Return an instance to whichever pool owns it
    ///
    /// Tries every known pool; at most one can match. Returns `false` when
    /// none does (the instance was never pooled here).
    pub fn release(&mut self, handle: InstanceHandle) -> bool {
        for pool in self.pools.values_mut() {
            if pool.release(handle) {
                return true;
            }
        }
        log::debug!("Release ignored: {:?} not held by any pool", handle);
        false
    }

    /// Get an active instance by handle
    pub fn get(&self, handle: InstanceHandle) -> Option<&T> {
        self.pools.get(&handle.prototype)?.get(handle)
    }

    /// Get an active instance mutably by handle
    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut T> {
        self.pools.get_mut(&handle.prototype)?.get_mut(handle)
    }

    /// Access the pool for a prototype, if one exists
    pub fn pool(&self, id: PrototypeId) -> Option<&ObjectPool<T>> {
        self.pools.get(&id)
    }

    /// Mutable access to the pool for a prototype, if one exists
    pub fn pool_mut(&mut self, id: PrototypeId) -> Option<&mut ObjectPool<T>> {
        self.pools.get_mut(&id)
    }

    /// Visit every active instance across all pools
    pub fn for_each_active_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(InstanceHandle, &mut T),
    {
        for pool in self.pools.values_mut() {
            pool.for_each_active_mut(&mut visit);
        }
    }

    /// Recover bookkeeping in every pool after an external reset
    pub fn rebuild_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.rebuild();
        }
    }

    /// Total instances currently in use across all pools
    pub fn active_count(&self) -> usize {
        self.pools.values().map(ObjectPool::active_count).sum()
    }

    /// Number of pools (static and dynamic)
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Aggregate statistics over every pool
    pub fn stats(&self) -> PoolStats {
        let mut total = PoolStats::default();
        for pool in self.pools.values() {
            let stats = pool.stats();
            total.active += stats.active;
            total.inactive += stats.inactive;
            total.peak_active += stats.peak_active;
            total.total_acquired += stats.total_acquired;
            total.total_released += stats.total_released;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestGem {
        visible: bool,
    }

    impl PooledInstance for TestGem {
        fn on_acquire(&mut self, _position: Vec3, _rotation: Quat) {
            self.visible = true;
        }

        fn on_release(&mut self) {
            self.visible = false;
        }

        fn is_visible(&self) -> bool {
            self.visible
        }
    }

    struct TestTemplate(PrototypeId);

    impl InstanceTemplate<TestGem> for TestTemplate {
        fn id(&self) -> PrototypeId {
            self.0
        }

        fn instantiate(&self) -> TestGem {
            TestGem { visible: false }
        }
    }

    fn template(id: u32) -> Rc<dyn InstanceTemplate<TestGem>> {
        Rc::new(TestTemplate(PrototypeId(id)))
    }

    #[test]
    fn test_template_less_static_pool_is_skipped() {
        let registry: PoolRegistry<TestGem> = PoolRegistry::new(
            vec![
                StaticPoolSpec {
                    template: None,
                    min_objects: 4,
                    max_objects: 8,
                },
                StaticPoolSpec {
                    template: Some(template(1)),
                    min_objects: 2,
                    max_objects: 8,
                },
            ],
            0,
            -1,
        );

        assert_eq!(registry.pool_count(), 1);
        assert!(registry.pool(PrototypeId(1)).is_some());
    }

    #[test]
    fn test_dynamic_pool_created_on_first_acquire() {
        let mut registry: PoolRegistry<TestGem> = PoolRegistry::new(Vec::new(), 1, -1);
        let proto = template(42);

        assert_eq!(registry.pool_count(), 0);
        let handle = registry
            .acquire(&proto, Vec3::zeros(), Quat::identity())
            .expect("dynamic acquire");
        assert_eq!(registry.pool_count(), 1);
        assert_eq!(handle.prototype, PrototypeId(42));
    }

    #[test]
    fn test_release_routes_to_owning_pool() {
        let mut registry: PoolRegistry<TestGem> = PoolRegistry::new(Vec::new(), 0, -1);
        let proto_a = template(1);
        let proto_b = template(2);

        let a = registry.acquire(&proto_a, Vec3::zeros(), Quat::identity()).expect("a");
        let b = registry.acquire(&proto_b, Vec3::zeros(), Quat::identity()).expect("b");

        assert!(registry.release(a));
        assert!(registry.release(b));
        assert!(!registry.release(a));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_static_pool_capacity_is_respected() {
        let mut registry: PoolRegistry<TestGem> = PoolRegistry::new(
            vec![StaticPoolSpec {
                template: Some(template(1)),
                min_objects: 2,
                max_objects: 2,
            }],
            0,
            -1,
        );
        let proto = template(1);

        assert!(registry.acquire(&proto, Vec3::zeros(), Quat::identity()).is_some());
        assert!(registry.acquire(&proto, Vec3::zeros(), Quat::identity()).is_some());
        assert!(registry.acquire(&proto, Vec3::zeros(), Quat::identity()).is_none());
    }
}
