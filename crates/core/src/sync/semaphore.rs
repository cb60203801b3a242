//! Counting semaphore with a FIFO wait queue.

use std::collections::VecDeque;

use crate::common::ThreadId;

/// A named counting semaphore.
///
/// The counter never goes negative: a `wait` that finds it at zero queues the caller
/// instead of decrementing. A `signal` with waiters hands the permit straight to the head
/// of the queue and leaves the counter untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Semaphore {
    name: String,
    value: u64,
    blocked: VecDeque<ThreadId>,
}

impl Semaphore {
    /// Creates a semaphore holding `initial` permits.
    pub fn new(name: impl Into<String>, initial: u64) -> Self {
        Self {
            name: name.into(),
            value: initial,
            blocked: VecDeque::new(),
        }
    }

    /// Name the semaphore is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Available permits.
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Blocked thread ids, head first.
    pub fn blocked(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.blocked.iter().copied()
    }

    /// Number of blocked threads.
    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    /// Takes a permit if one is available.
    pub(crate) const fn try_acquire(&mut self) -> bool {
        if self.value > 0 {
            self.value -= 1;
            true
        } else {
            false
        }
    }

    /// Queues a thread that failed to acquire.
    pub(crate) fn enqueue(&mut self, id: ThreadId) {
        debug_assert_eq!(self.value, 0);
        self.blocked.push_back(id);
    }

    /// Releases a permit: wakes the head waiter if there is one, else increments.
    pub(crate) fn release(&mut self) -> Option<ThreadId> {
        let woken = self.blocked.pop_front();
        if woken.is_none() {
            self.value += 1;
        }
        woken
    }
}
