//! Pooled-object lifecycle management
//!
//! Provides fixed-identity pools of recyclable instances so that thousands
//! of short-lived objects can churn without per-frame allocation. Each pool
//! is keyed by a prototype, preallocates a minimum population, bounds its
//! concurrent actives, and hands out generation-counted handles so stale
//! references die instead of touching a recycled slot.
//!
//! # Architecture
//!
//! ```text
//! PoolRegistry
//!      ├── ObjectPool (per prototype)
//!      │        ├── entries: Vec<PoolEntry>   (stable slots)
//!      │        ├── active: HashSet<InstanceHandle>
//!      │        └── inactive: VecDeque<index> (FIFO recycle queue)
//!      ↓
//! Handle-based access, O(1) acquire/release
//! ```

pub mod registry;

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::foundation::math::{Quat, Vec3};

pub use registry::{PoolRegistry, StaticPoolSpec};

/// Identity of a prototype, shared by a template and the pool built from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrototypeId(pub u32);

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proto#{}", self.0)
    }
}

/// Handle to a pooled instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    /// Prototype identity of the owning pool
    pub prototype: PrototypeId,
    /// Slot index in the pool
    pub index: u32,
    /// Generation counter for stale-handle detection
    pub generation: u32,
}

/// Behaviour a type needs to live inside an [`ObjectPool`]
pub trait PooledInstance {
    /// Reset and place the instance as it leaves the pool
    fn on_acquire(&mut self, position: Vec3, rotation: Quat);

    /// Called as the instance returns to the pool
    fn on_release(&mut self);

    /// Visibility flag; what [`ObjectPool::rebuild`] reclassifies slots by
    fn is_visible(&self) -> bool;
}

/// A template that originates pool instances and supplies the pool's identity
pub trait InstanceTemplate<T> {
    /// Identity used to key the pool
    fn id(&self) -> PrototypeId;

    /// Construct a fresh instance from this template
    fn instantiate(&self) -> T;
}

/// One slot in a pool
struct PoolEntry<T> {
    instance: T,
    generation: u32,
    active: bool,
}

/// Usage statistics for a pool
#[derive(Debug, Default, Clone, Copy)]
pub struct PoolStats {
    /// Instances currently in use
    pub active: usize,
    /// Instances waiting in the recycle queue
    pub inactive: usize,
    /// Maximum number of instances active simultaneously
    pub peak_active: usize,
    /// Acquires served since pool creation
    pub total_acquired: u64,
    /// Releases accepted since pool creation
    pub total_released: u64,
}

/// Fixed-identity pool of recyclable instances keyed by one prototype
pub struct ObjectPool<T> {
    template: Option<Rc<dyn InstanceTemplate<T>>>,
    /// Maximum concurrent actives; negative means unbounded
    max_objects: i32,
    entries: Vec<PoolEntry<T>>,
    active: HashSet<InstanceHandle>,
    inactive: VecDeque<u32>,
    peak_active: usize,
    total_acquired: u64,
    total_released: u64,
}

impl<T: PooledInstance> ObjectPool<T> {
    /// Create a pool for the given template
    ///
    /// A pool built without a template is inert: it logs on
    /// [`initialize`](Self::initialize) and never yields instances.
    pub fn new(template: Option<Rc<dyn InstanceTemplate<T>>>, max_objects: i32) -> Self {
        Self {
            template,
            max_objects,
            entries: Vec::new(),
            active: HashSet::new(),
            inactive: VecDeque::new(),
            peak_active: 0,
            total_acquired: 0,
            total_released: 0,
        }
    }

    /// Prototype identity, if a template is set
    pub fn prototype(&self) -> Option<PrototypeId> {
        self.template.as_ref().map(|t| t.id())
    }

    /// Preallocate `min_count` inactive instances from the template
    pub fn initialize(&mut self, min_count: usize) {
        let Some(template) = self.template.as_ref() else {
            log::error!("Failed to initialize pool, no template defined");
            return;
        };

        for _ in 0..min_count {
            let index = self.entries.len() as u32;
            self.entries.push(PoolEntry {
                instance: template.instantiate(),
                generation: 0,
                active: false,
            });
            self.inactive.push_back(index);
        }

        log::info!(
            "Initialized pool {} with {} preallocated instances (max {})",
            template.id(),
            min_count,
            self.max_objects,
        );
    }

    /// Whether a new instance may be constructed right now
    fn can_grow(&self) -> bool {
        self.max_objects < 0 || self.active.len() < self.max_objects as usize
    }

    /// Take an instance from the pool, or construct one if the cap allows
    ///
    /// Returns `None` when the pool is exhausted (no recyclable instance
    /// and the active count has reached `max_objects`).
    pub fn acquire(&mut self, position: Vec3, rotation: Quat) -> Option<InstanceHandle> {
        let prototype = self.prototype()?;

        // First try to recycle an inactive instance
        let index = match self.inactive.pop_front() {
            Some(index) => index,
            None => {
                // Otherwise construct a new one if we are allowed
                if !self.can_grow() {
                    log::debug!("Pool {} exhausted: {} active", prototype, self.active.len());
                    return None;
                }
                let template = self.template.as_ref()?;
                let index = self.entries.len() as u32;
                self.entries.push(PoolEntry {
                    instance: template.instantiate(),
                    generation: 0,
                    active: false,
                });
                index
            }
        };

        let entry = &mut self.entries[index as usize];
        entry.generation += 1;
        entry.active = true;
        entry.instance.on_acquire(position, rotation);

        let handle = InstanceHandle {
            prototype,
            index,
            generation: entry.generation,
        };
        self.active.insert(handle);

        self.total_acquired += 1;
        self.peak_active = self.peak_active.max(self.active.len());

        Some(handle)
    }

    /// Return an instance to the pool
    ///
    /// Returns `false` when the handle is not a member of this pool's
    /// active set (wrong pool, stale generation, or already released).
    pub fn release(&mut self, handle: InstanceHandle) -> bool {
        if !self.active.remove(&handle) {
            return false;
        }

        let entry = &mut self.entries[handle.index as usize];
        entry.active = false;
        entry.instance.on_release();
        self.inactive.push_back(handle.index);

        self.total_released += 1;
        true
    }

    /// Reclassify every slot by its instance's visibility flag
    ///
    /// Recovers the active/inactive bookkeeping after the host toggled
    /// visibility out-of-band (scene resets and the like). Handles to
    /// still-visible instances stay valid.
    pub fn rebuild(&mut self) {
        let Some(prototype) = self.prototype() else {
            return;
        };

        self.active.clear();
        self.inactive.clear();

        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.instance.is_visible() {
                entry.active = true;
                self.active.insert(InstanceHandle {
                    prototype,
                    index: index as u32,
                    generation: entry.generation,
                });
            } else {
                entry.active = false;
                self.inactive.push_back(index as u32);
            }
        }

        log::debug!(
            "Rebuilt pool {}: {} active, {} inactive",
            prototype,
            self.active.len(),
            self.inactive.len(),
        );
    }

    /// Whether `handle` refers to a live instance of this pool
    fn validates(&self, handle: InstanceHandle) -> bool {
        self.prototype() == Some(handle.prototype)
            && (handle.index as usize) < self.entries.len()
            && self.entries[handle.index as usize].active
            && self.entries[handle.index as usize].generation == handle.generation
    }

    /// Get an active instance by handle
    pub fn get(&self, handle: InstanceHandle) -> Option<&T> {
        if self.validates(handle) {
            Some(&self.entries[handle.index as usize].instance)
        } else {
            None
        }
    }

    /// Get an active instance mutably by handle
    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut T> {
        if self.validates(handle) {
            Some(&mut self.entries[handle.index as usize].instance)
        } else {
            None
        }
    }

    /// Visit every active instance with its handle
    pub fn for_each_active_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(InstanceHandle, &mut T),
    {
        let Some(prototype) = self.prototype() else {
            return;
        };
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.active {
                let handle = InstanceHandle {
                    prototype,
                    index: index as u32,
                    generation: entry.generation,
                };
                visit(handle, &mut entry.instance);
            }
        }
    }

    /// Visit every slot, active or not (host-side maintenance, e.g. before
    /// a [`rebuild`](Self::rebuild))
    pub fn for_each_instance_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut T),
    {
        for entry in &mut self.entries {
            visit(&mut entry.instance);
        }
    }

    /// Number of instances currently in use
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of instances waiting in the recycle queue
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// Current usage statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active.len(),
            inactive: self.inactive.len(),
            peak_active: self.peak_active,
            total_acquired: self.total_acquired,
            total_released: self.total_released,
        }
    }
}
