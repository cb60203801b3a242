use super::{ReadyQueue, SchedulingPolicy};
use crate::config::SchedulerKind;
use crate::thread::ThreadTable;

/// First-come-first-served: always the head of the queue, never preempted.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fcfs;

impl SchedulingPolicy for Fcfs {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Fcfs
    }

    fn select(&self, ready: &ReadyQueue, _threads: &ThreadTable) -> Option<usize> {
        (!ready.is_empty()).then_some(0)
    }
}
