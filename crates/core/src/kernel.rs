//! Simulated CPU cores.
//!
//! A `Kernel` is either idle or bound to exactly one running thread. `CoreSet` owns the
//! kernels in id order and is what the dispatch and execution passes walk.

use crate::common::{KernelId, ThreadId};

/// One simulated core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Kernel {
    id: KernelId,
    current: Option<ThreadId>,
    /// Occupant after the previous tick's dispatch pass, for context-switch accounting.
    last_occupant: Option<ThreadId>,
    busy_ticks: u64,
}

impl Kernel {
    /// Creates an idle core.
    pub const fn new(id: KernelId) -> Self {
        Self {
            id,
            current: None,
            last_occupant: None,
            busy_ticks: 0,
        }
    }

    /// Core id.
    pub const fn id(&self) -> KernelId {
        self.id
    }

    /// Thread currently bound to this core.
    pub const fn current_thread(&self) -> Option<ThreadId> {
        self.current
    }

    /// `true` when no thread is bound.
    pub const fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Ticks on which this core executed a unit of work.
    pub const fn busy_ticks(&self) -> u64 {
        self.busy_ticks
    }

    pub(crate) fn assign(&mut self, thread: ThreadId) {
        debug_assert!(self.current.is_none(), "core {} already busy", self.id);
        self.current = Some(thread);
    }

    /// Unbinds the current thread, returning it.
    pub(crate) const fn release(&mut self) -> Option<ThreadId> {
        self.current.take()
    }

    /// Records this tick's occupant. Returns `true` if a different thread was switched in.
    pub(crate) fn note_occupant(&mut self) -> bool {
        let switched = self.current.is_some() && self.current != self.last_occupant;
        self.last_occupant = self.current;
        switched
    }

    pub(crate) const fn record_busy_tick(&mut self) {
        self.busy_ticks += 1;
    }
}

/// The set of cores, indexed by `KernelId`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreSet {
    kernels: Vec<Kernel>,
}

impl CoreSet {
    /// Creates `count` idle cores with ids `0..count`.
    pub fn new(count: usize) -> Self {
        Self {
            kernels: (0..count).map(|i| Kernel::new(KernelId(i))).collect(),
        }
    }

    /// Number of cores.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// `true` for a zero-core set (never produced by a validated config).
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Looks up a core.
    pub fn get(&self, id: KernelId) -> Option<&Kernel> {
        self.kernels.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: KernelId) -> Option<&mut Kernel> {
        self.kernels.get_mut(id.0)
    }

    /// Cores in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Kernel> {
        self.kernels.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Kernel> {
        self.kernels.iter_mut()
    }

    /// Ids of idle cores in ascending order.
    pub fn idle_ids(&self) -> Vec<KernelId> {
        self.kernels
            .iter()
            .filter(|k| k.is_idle())
            .map(Kernel::id)
            .collect()
    }

    /// Number of cores with a bound thread.
    pub fn busy_count(&self) -> usize {
        self.kernels.iter().filter(|k| !k.is_idle()).count()
    }

    /// Resizes to `count` cores.
    ///
    /// New cores start idle. Returns the threads that were bound to removed cores, in
    /// core-id order; the caller must move them back to the ready queue.
    pub(crate) fn resize(&mut self, count: usize) -> Vec<ThreadId> {
        let evicted = if count < self.kernels.len() {
            self.kernels
                .drain(count..)
                .filter_map(|k| k.current)
                .collect()
        } else {
            Vec::new()
        };
        let start = self.kernels.len();
        self.kernels
            .extend((start..count).map(|i| Kernel::new(KernelId(i))));
        evicted
    }
}
