//! Active-set scheduling of per-frame simulation ticks
//!
//! Maintains the set of instances that need ticking each frame. All
//! registration traffic goes through deferred queues: a pass first applies
//! pending additions, then pending removals, then ticks a snapshot of the
//! set. Entities may freely register or unregister from inside a tick —
//! the mutation lands before the next pass, never mid-iteration, so no
//! entity is skipped or ticked twice within one pass.

use std::collections::{HashSet, VecDeque};

use crate::pool::InstanceHandle;

/// Deferred registration traffic for the scheduler
///
/// Handed to entities during a tick pass so they can mutate the active set
/// without touching the iteration in progress. Both operations are
/// idempotent: repeated or redundant requests are safe no-ops.
#[derive(Debug, Default)]
pub struct SchedulerOps {
    additions: VecDeque<InstanceHandle>,
    removals: VecDeque<InstanceHandle>,
}

impl SchedulerOps {
    /// Queue an instance for ticking starting next pass
    pub fn register(&mut self, handle: InstanceHandle) {
        self.additions.push_back(handle);
    }

    /// Queue an instance for removal from ticking after the current pass
    pub fn unregister(&mut self, handle: InstanceHandle) {
        self.removals.push_back(handle);
    }
}

/// Set of instances ticked once per frame, with deferred add/remove
#[derive(Debug, Default)]
pub struct ActiveSetScheduler {
    ticking: HashSet<InstanceHandle>,
    ops: SchedulerOps,
    scratch: Vec<InstanceHandle>,
}

impl ActiveSetScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an instance for ticking starting next pass
    pub fn register(&mut self, handle: InstanceHandle) {
        self.ops.register(handle);
    }

    /// Queue an instance for removal from ticking
    pub fn unregister(&mut self, handle: InstanceHandle) {
        self.ops.unregister(handle);
    }

    /// The deferred registration queues; drivers hand this to entities
    /// when building tick contexts outside a pass
    pub fn ops_mut(&mut self) -> &mut SchedulerOps {
        &mut self.ops
    }

    /// Apply queued additions, then queued removals
    ///
    /// A handle queued for both in the same window ends up removed.
    fn apply_pending(&mut self) {
        while let Some(handle) = self.ops.additions.pop_front() {
            self.ticking.insert(handle);
        }
        while let Some(handle) = self.ops.removals.pop_front() {
            self.ticking.remove(&handle);
        }
    }

    /// Run one scheduling pass
    ///
    /// Pending mutations are applied first, then every member is ticked
    /// with the frame's elapsed time. The callback receives a
    /// [`SchedulerOps`] for deferred registration changes.
    pub fn run_pass<F>(&mut self, dt: f32, mut tick: F)
    where
        F: FnMut(InstanceHandle, f32, &mut SchedulerOps),
    {
        self.apply_pending();

        // Snapshot into the reused scratch buffer; the set itself must not
        // change while the pass runs
        self.scratch.clear();
        self.scratch.extend(self.ticking.iter().copied());

        for &handle in &self.scratch {
            tick(handle, dt, &mut self.ops);
        }
    }

    /// Whether an instance is in the ticking set (pending traffic is not
    /// considered until the next pass)
    pub fn is_ticking(&self, handle: InstanceHandle) -> bool {
        self.ticking.contains(&handle)
    }

    /// Number of instances in the ticking set
    pub fn len(&self) -> usize {
        self.ticking.len()
    }

    /// Whether the ticking set is empty
    pub fn is_empty(&self) -> bool {
        self.ticking.is_empty()
    }
}
