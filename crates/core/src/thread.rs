//! Simulated threads and the thread table.
//!
//! This module owns thread lifecycle state. It provides:
//! 1. **State Machine:** `ThreadState` and the transitions the engine is allowed to apply.
//! 2. **Accounting:** Per-thread run counters and arrival/start/finish ticks.
//! 3. **Table:** `ThreadTable`, the id-ordered owner of every thread ever created.
//!
//! Transition methods are crate-private and assume the engine already checked the
//! source state; they only `debug_assert!` it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{KernelId, SimError, ThreadId};

/// Lifecycle state of a simulated thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreadState {
    /// Waiting in the ready queue for a core.
    Ready,
    /// Bound to a core and consuming work.
    Running,
    /// Suspended on a semaphore or monitor queue.
    Blocked,
    /// All work done; retained for display until reset.
    Terminated,
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadState::Ready => write!(f, "READY"),
            ThreadState::Running => write!(f, "RUNNING"),
            ThreadState::Blocked => write!(f, "BLOCKED"),
            ThreadState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// A simulated user thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thread {
    id: ThreadId,
    name: String,
    priority: i32,
    burst: u64,
    remaining: u64,
    state: ThreadState,
    mapped_kernel: Option<KernelId>,
    /// Consecutive ticks executed since the last dispatch.
    run_ticks: u64,
    arrival_tick: u64,
    start_tick: Option<u64>,
    finish_tick: Option<u64>,
}

impl Thread {
    fn new(id: ThreadId, name: String, burst: u64, priority: i32, arrival_tick: u64) -> Self {
        Self {
            id,
            name,
            priority,
            burst,
            remaining: burst,
            state: ThreadState::Ready,
            mapped_kernel: None,
            run_ticks: 0,
            arrival_tick,
            start_tick: None,
            finish_tick: None,
        }
    }

    /// Unique id.
    pub const fn id(&self) -> ThreadId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scheduling priority; lower values are more urgent.
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Total work units.
    pub const fn burst(&self) -> u64 {
        self.burst
    }

    /// Work units left.
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> ThreadState {
        self.state
    }

    /// Core this thread occupies; `Some` iff the thread is running.
    pub const fn mapped_kernel(&self) -> Option<KernelId> {
        self.mapped_kernel
    }

    /// Consecutive ticks executed on the current core.
    pub const fn run_ticks(&self) -> u64 {
        self.run_ticks
    }

    /// Number of ticks that had elapsed when the thread was created.
    pub const fn arrival_tick(&self) -> u64 {
        self.arrival_tick
    }

    /// Tick of the first dispatch.
    pub const fn start_tick(&self) -> Option<u64> {
        self.start_tick
    }

    /// Tick on which the last unit of work was executed.
    pub const fn finish_tick(&self) -> Option<u64> {
        self.finish_tick
    }

    /// Ticks from arrival to termination, once terminated.
    pub fn turnaround(&self) -> Option<u64> {
        self.finish_tick
            .map(|finish| finish.saturating_sub(self.arrival_tick))
    }

    /// Ticks spent not executing between arrival and termination, once terminated.
    pub fn waiting_time(&self) -> Option<u64> {
        self.turnaround().map(|t| t.saturating_sub(self.burst))
    }

    /// Checks that the thread is in `expected`, naming `op` in the error otherwise.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidStateTransition`] when the states differ.
    pub fn ensure_state(&self, expected: ThreadState, op: &'static str) -> Result<(), SimError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SimError::InvalidStateTransition {
                thread: self.id,
                op,
                actual: self.state,
                expected,
            })
        }
    }

    /// `READY -> RUNNING` on `kernel` at tick `now`.
    pub(crate) fn dispatch(&mut self, kernel: KernelId, now: u64) {
        debug_assert_eq!(self.state, ThreadState::Ready);
        self.state = ThreadState::Running;
        self.mapped_kernel = Some(kernel);
        self.run_ticks = 0;
        let _ = self.start_tick.get_or_insert(now);
    }

    /// Consumes one unit of work. Returns `true` if the burst is exhausted.
    pub(crate) fn execute_unit(&mut self) -> bool {
        debug_assert_eq!(self.state, ThreadState::Running);
        self.remaining = self.remaining.saturating_sub(1);
        self.run_ticks += 1;
        self.remaining == 0
    }

    /// `RUNNING -> READY`; the caller re-queues the thread.
    pub(crate) fn preempt(&mut self) {
        debug_assert_eq!(self.state, ThreadState::Running);
        self.state = ThreadState::Ready;
        self.mapped_kernel = None;
        self.run_ticks = 0;
    }

    /// `RUNNING -> BLOCKED`; the caller frees the core and enqueues the id.
    pub(crate) fn block(&mut self) {
        debug_assert_eq!(self.state, ThreadState::Running);
        self.state = ThreadState::Blocked;
        self.mapped_kernel = None;
        self.run_ticks = 0;
    }

    /// `BLOCKED -> READY`; the caller re-queues the thread.
    pub(crate) fn wake(&mut self) {
        debug_assert_eq!(self.state, ThreadState::Blocked);
        self.state = ThreadState::Ready;
    }

    /// `RUNNING -> TERMINATED` at tick `now`.
    pub(crate) fn terminate(&mut self, now: u64) {
        debug_assert_eq!(self.state, ThreadState::Running);
        self.state = ThreadState::Terminated;
        self.mapped_kernel = None;
        self.finish_tick = Some(now);
    }
}

/// Owner of all threads, ordered by id.
#[derive(Debug)]
pub struct ThreadTable {
    threads: BTreeMap<ThreadId, Thread>,
    next_id: u64,
}

impl Default for ThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadTable {
    /// Creates an empty table whose first id will be 1.
    pub const fn new() -> Self {
        Self {
            threads: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Creates a `READY` thread and returns its id.
    ///
    /// `name` defaults to `T{id}`. Burst validation is the engine's job.
    pub fn spawn(
        &mut self,
        name: Option<String>,
        burst: u64,
        priority: i32,
        arrival_tick: u64,
    ) -> ThreadId {
        let id = ThreadId(self.next_id);
        self.next_id += 1;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("T{id}"));
        let _ = self
            .threads
            .insert(id, Thread::new(id, name, burst, priority, arrival_tick));
        id
    }

    /// Looks up a thread.
    pub fn get(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(&id)
    }

    /// Looks up a thread mutably.
    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut Thread> {
        self.threads.get_mut(&id)
    }

    /// Looks up a thread, failing with `NotFound`.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown id.
    pub fn require(&self, id: ThreadId) -> Result<&Thread, SimError> {
        self.get(id).ok_or_else(|| SimError::thread_not_found(id))
    }

    /// All threads in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }

    /// Number of threads, terminated ones included.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// `true` when no thread has been created since the last reset.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Number of threads in `state`.
    pub fn count_in(&self, state: ThreadState) -> usize {
        self.iter().filter(|t| t.state == state).count()
    }

    /// `true` when every thread has terminated (vacuously true when empty).
    pub fn all_terminated(&self) -> bool {
        self.iter().all(|t| t.state == ThreadState::Terminated)
    }

    /// Drops every thread and restarts id assignment at 1.
    pub fn clear(&mut self) {
        self.threads.clear();
        self.next_id = 1;
    }
}
