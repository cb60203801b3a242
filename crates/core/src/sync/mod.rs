//! Synchronization primitives.
//!
//! This module holds the data side of synchronization:
//! 1. **Semaphore:** Counting semaphore with direct hand-off on `signal`.
//! 2. **Monitor:** Single-condition monitor with `wait`/`signal`/`broadcast`.
//! 3. **Registry:** Name-keyed owner of both kinds.
//!
//! Thread state changes (blocking, waking, freeing cores) are applied by the engine, which
//! is the only place that can see threads, cores and queues together.

/// Single-condition monitor.
pub mod monitor;
/// Name-keyed registry.
pub mod registry;
/// Counting semaphore.
pub mod semaphore;

pub use monitor::{DEFAULT_CONDITION, Monitor};
pub use registry::SyncRegistry;
pub use semaphore::Semaphore;
