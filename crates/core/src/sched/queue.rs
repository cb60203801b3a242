//! Arrival-ordered ready queue.

use std::collections::VecDeque;

use crate::common::ThreadId;

/// FIFO of `READY` thread ids, in the order they became ready.
///
/// Policies select an index into this queue; only the selected entry is removed, so the
/// relative order of everything else survives policy switches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadyQueue {
    queue: VecDeque<ThreadId>,
}

impl ReadyQueue {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Appends `id` at the tail unless it is already queued.
    pub fn push_back(&mut self, id: ThreadId) {
        if !self.contains(id) {
            self.queue.push_back(id);
        }
    }

    /// Removes and returns the entry at `index`.
    pub fn take(&mut self, index: usize) -> Option<ThreadId> {
        self.queue.remove(index)
    }

    /// `true` if `id` is queued.
    pub fn contains(&self, id: ThreadId) -> bool {
        self.queue.contains(&id)
    }

    /// Queued ids, head first.
    pub fn iter(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.queue.iter().copied()
    }

    /// Number of queued ids.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Empties the queue.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
