//! Scheduling policies and the ready queue.
//!
//! This module defines the pluggable scheduler:
//! 1. **`ReadyQueue`**: one arrival-ordered queue shared by every policy.
//! 2. **`SchedulingPolicy`**: the trait a policy implements (selection and preemption).
//! 3. **`Scheduler`**: the queue plus the active policy, switchable at runtime.
//!
//! Switching policy never touches the queue; it only changes which entry is picked next.

/// First-come-first-served.
pub mod fcfs;
/// Non-preemptive priority.
pub mod priority;
/// Arrival-ordered ready queue.
pub mod queue;
/// Round-robin with a fixed quantum.
pub mod round_robin;

use std::fmt;

use crate::common::ThreadId;
use crate::config::SchedulerKind;
use crate::thread::ThreadTable;

pub use fcfs::Fcfs;
pub use priority::Priority;
pub use queue::ReadyQueue;
pub use round_robin::RoundRobin;

/// A scheduling policy.
pub trait SchedulingPolicy: fmt::Debug + Send {
    /// Which configured policy this is.
    fn kind(&self) -> SchedulerKind;

    /// Index into `ready` of the thread to dispatch next, or `None` to leave the core idle.
    fn select(&self, ready: &ReadyQueue, threads: &ThreadTable) -> Option<usize>;

    /// Whether a running thread that has executed `run_ticks` consecutive ticks must give
    /// up its core. Non-preemptive policies keep the default.
    fn should_preempt(&self, run_ticks: u64, quantum: u64) -> bool {
        let _ = (run_ticks, quantum);
        false
    }
}

/// Builds the policy object for `kind`.
pub fn policy_for(kind: SchedulerKind) -> Box<dyn SchedulingPolicy> {
    match kind {
        SchedulerKind::Fcfs => Box::new(Fcfs),
        SchedulerKind::RoundRobin => Box::new(RoundRobin),
        SchedulerKind::Priority => Box::new(Priority),
    }
}

/// The ready queue together with the active policy.
#[derive(Debug)]
pub struct Scheduler {
    ready: ReadyQueue,
    policy: Box<dyn SchedulingPolicy>,
}

impl Scheduler {
    /// Creates an empty scheduler running `kind`.
    pub fn new(kind: SchedulerKind) -> Self {
        Self {
            ready: ReadyQueue::new(),
            policy: policy_for(kind),
        }
    }

    /// Active policy.
    pub fn kind(&self) -> SchedulerKind {
        self.policy.kind()
    }

    /// Swaps the selection rule; queued threads keep their order.
    pub fn set_policy(&mut self, kind: SchedulerKind) {
        if kind != self.policy.kind() {
            self.policy = policy_for(kind);
        }
    }

    /// The ready queue.
    pub const fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    /// Appends a newly ready thread at the tail.
    pub fn enqueue(&mut self, id: ThreadId) {
        self.ready.push_back(id);
    }

    /// Removes and returns the thread the policy selects.
    pub fn pick_next(&mut self, threads: &ThreadTable) -> Option<ThreadId> {
        let index = self.policy.select(&self.ready, threads)?;
        self.ready.take(index)
    }

    /// See [`SchedulingPolicy::should_preempt`].
    pub fn should_preempt(&self, run_ticks: u64, quantum: u64) -> bool {
        self.policy.should_preempt(run_ticks, quantum)
    }

    /// Empties the ready queue, keeping the policy.
    pub fn clear(&mut self) {
        self.ready.clear();
    }
}
