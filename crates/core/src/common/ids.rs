//! Strongly typed identifiers.
//!
//! Thread ids and kernel ids are both small integers; wrapping them keeps a core index
//! from ever being passed where a thread id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a simulated thread.
///
/// Ids are assigned monotonically from 1 by the thread table and restart after a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

/// Identifies a simulated core (kernel thread), in `0..core_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KernelId(pub usize);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ThreadId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<usize> for KernelId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}
