//! Serializable views of engine state.
//!
//! A [`Snapshot`] is what polling clients receive. Building one only reads the engine, so
//! two snapshots taken with no action in between compare equal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{KernelId, ThreadId};
use crate::config::{MappingModel, SchedulerKind};
use crate::kernel::Kernel;
use crate::sync::{Monitor, Semaphore};
use crate::thread::{Thread, ThreadState};

/// One row of the thread table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadView {
    /// Thread id.
    pub id: ThreadId,
    /// Display name.
    pub name: String,
    /// Lifecycle state.
    pub state: ThreadState,
    /// Work units left.
    pub remaining: u64,
    /// Total work units.
    pub burst: u64,
    /// Priority (lower is more urgent).
    pub priority: i32,
    /// Core the thread runs on, if running.
    pub mapped_kernel: Option<KernelId>,
    /// Tick the thread terminated on, if it has.
    pub finish_tick: Option<u64>,
}

impl From<&Thread> for ThreadView {
    fn from(t: &Thread) -> Self {
        Self {
            id: t.id(),
            name: t.name().to_owned(),
            state: t.state(),
            remaining: t.remaining(),
            burst: t.burst(),
            priority: t.priority(),
            mapped_kernel: t.mapped_kernel(),
            finish_tick: t.finish_tick(),
        }
    }
}

/// One core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelView {
    /// Core id.
    pub id: KernelId,
    /// Bound thread, if any.
    pub current_thread: Option<ThreadId>,
    /// Ticks this core spent executing.
    pub busy_ticks: u64,
}

impl From<&Kernel> for KernelView {
    fn from(k: &Kernel) -> Self {
        Self {
            id: k.id(),
            current_thread: k.current_thread(),
            busy_ticks: k.busy_ticks(),
        }
    }
}

/// One semaphore.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemaphoreView {
    /// Available permits.
    pub value: u64,
    /// Blocked thread ids, head first.
    pub blocked: Vec<ThreadId>,
}

impl From<&Semaphore> for SemaphoreView {
    fn from(s: &Semaphore) -> Self {
        Self {
            value: s.value(),
            blocked: s.blocked().collect(),
        }
    }
}

/// One monitor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorView {
    /// Thread ids waiting on the default condition, head first.
    pub waiting: Vec<ThreadId>,
}

impl From<&Monitor> for MonitorView {
    fn from(m: &Monitor) -> Self {
        Self {
            waiting: m.waiting().collect(),
        }
    }
}

/// Counters exposed to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsView {
    /// Threads that terminated.
    pub completed: u64,
    /// Context switches.
    pub context_switches: u64,
    /// Round-robin preemptions.
    pub preemptions: u64,
    /// Busy fraction of all core-ticks.
    pub utilization: f64,
    /// Mean turnaround of terminated threads.
    pub avg_turnaround: Option<f64>,
    /// Mean waiting time of terminated threads.
    pub avg_waiting: Option<f64>,
}

/// Full state of the engine at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks executed since the last reset.
    pub tick: u64,
    /// Whether the auto-run flag is set.
    pub running: bool,
    /// Every thread, in id order.
    pub threads: Vec<ThreadView>,
    /// Every core, in id order.
    pub kernels: Vec<KernelView>,
    /// Ready queue, head first.
    pub ready_queue: Vec<ThreadId>,
    /// Semaphores by name.
    pub semaphores: BTreeMap<String, SemaphoreView>,
    /// Monitors by name.
    pub monitors: BTreeMap<String, MonitorView>,
    /// Counters.
    pub stats: StatsView,
    /// Threading model label.
    pub model: MappingModel,
    /// Active scheduling policy.
    pub scheduler: SchedulerKind,
    /// Round-robin quantum.
    pub quantum: u64,
    /// Number of cores.
    pub core_count: usize,
}

impl Snapshot {
    /// Looks up a thread row by id.
    pub fn thread(&self, id: ThreadId) -> Option<&ThreadView> {
        self.threads.iter().find(|t| t.id == id)
    }

    /// Serializes to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures (not expected for this type).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
