//! Simplified monitor: one implicit condition variable, no mutual-exclusion lock.

use std::collections::VecDeque;

use crate::common::ThreadId;

/// Name of the only condition a monitor recognises.
pub const DEFAULT_CONDITION: &str = "default";

/// A named monitor exposing `wait`/`signal`/`broadcast` on its default condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monitor {
    name: String,
    waiting: VecDeque<ThreadId>,
}

impl Monitor {
    /// Creates a monitor with an empty condition queue.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waiting: VecDeque::new(),
        }
    }

    /// Name the monitor is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waiting thread ids, head first.
    pub fn waiting(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.waiting.iter().copied()
    }

    /// Number of waiting threads.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub(crate) fn wait(&mut self, id: ThreadId) {
        self.waiting.push_back(id);
    }

    /// Dequeues the head waiter.
    pub(crate) fn signal(&mut self) -> Option<ThreadId> {
        self.waiting.pop_front()
    }

    /// Dequeues every waiter, in wait order.
    pub(crate) fn broadcast(&mut self) -> Vec<ThreadId> {
        self.waiting.drain(..).collect()
    }
}

/// `true` if `cond` names the default condition (absent means default).
pub fn is_default_condition(cond: Option<&str>) -> bool {
    cond.is_none_or(|c| c == DEFAULT_CONDITION)
}
