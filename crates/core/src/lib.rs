//! Thread scheduling and synchronization simulator library.
//!
//! This crate implements a deterministic, tick-driven model of an operating system's
//! thread scheduler with the following:
//! 1. **Threads:** A thread table with the `READY/RUNNING/BLOCKED/TERMINATED` state machine.
//! 2. **Cores:** A fixed (reconfigurable) set of kernels, each idle or bound to one thread.
//! 3. **Scheduling:** One arrival-ordered ready queue with pluggable FCFS, RR and PRIORITY policies.
//! 4. **Synchronization:** Named counting semaphores and single-condition monitors.
//! 5. **Simulation:** The engine that orchestrates ticks, the action boundary, snapshots and
//!    a timed auto-runner.

/// Common types (identifiers and the error taxonomy).
pub mod common;
/// Simulator configuration (defaults, policy and model enums, validation).
pub mod config;
/// Simulated CPU cores.
pub mod kernel;
/// Scheduling policies and the ready queue.
pub mod sched;
/// Engine, action boundary, demo scenario and auto-runner.
pub mod sim;
/// Serializable views of engine state.
pub mod snapshot;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Semaphores, monitors and the registry that owns them.
pub mod sync;
/// Simulated threads and the thread table.
pub mod thread;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error type returned by every fallible engine operation.
pub use crate::common::SimError;
/// The simulation engine; owns all threads, cores, primitives and statistics.
pub use crate::sim::Engine;
/// Point-in-time view of the whole engine.
pub use crate::snapshot::Snapshot;
