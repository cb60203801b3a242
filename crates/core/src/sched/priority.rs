//! Non-preemptive priority scheduling.
//!
//! Lower numeric priority is more urgent. Among equal priorities the oldest thread (lowest
//! id) wins, wherever it sits in the ready queue. A running thread is never displaced by a more urgent arrival;
//! priority only matters when a core falls idle.

use super::{ReadyQueue, SchedulingPolicy};
use crate::config::SchedulerKind;
use crate::thread::ThreadTable;

/// Lowest priority value first, ties by thread id.
#[derive(Clone, Copy, Debug, Default)]
pub struct Priority;

impl SchedulingPolicy for Priority {
    fn kind(&self) -> SchedulerKind {
        SchedulerKind::Priority
    }

    fn select(&self, ready: &ReadyQueue, threads: &ThreadTable) -> Option<usize> {
        ready
            .iter()
            .enumerate()
            .filter_map(|(index, id)| threads.get(id).map(|t| (t.priority(), id, index)))
            // Ids are unique, so `min` never has to compare indices.
            .min()
            .map(|(_, _, index)| index)
    }
}
