//! Round-robin scheduling.
//!
//! Selection is identical to FCFS. The difference is preemption: once a thread has run
//! `quantum` consecutive ticks and still has work left, the engine takes its core at the
//! end of that tick and appends it to the tail of the ready queue, behind everything that
//! was already waiting.

use super::{ReadyQueue, SchedulingPolicy};
use crate::config::SchedulerKind;
use crate::thread::ThreadTable;

/// Round-robin with a time slice of `quantum` ticks.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin;

impl SchedulingPolicy for RoundRobin {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::RoundRobin
    }

    fn select(&self, ready: &ReadyQueue, _threads: &ThreadTable) -> Option<usize> {
        (!ready.is_empty()).then_some(0)
    }

    fn should_preempt(&self, run_ticks: u64, quantum: u64) -> bool {
        run_ticks >= quantum
    }
}
