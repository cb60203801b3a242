//! Engine, request boundary and auto-runner.
//!
//! 1. **Engine:** [`Engine`] owns all state and implements every action and the tick.
//! 2. **Demo:** [`Engine::init_demo`] loads the fixed four-thread scenario.
//! 3. **Actions:** [`Action`] / [`Reply`] are the serializable request boundary used by
//!    transports; every reply carries a fresh [`Snapshot`](crate::Snapshot).
//! 4. **Runner:** [`SharedEngine`] and [`AutoRunner`] drive timed ticks from a background
//!    thread while the auto-run flag is set.

/// Serializable request/response boundary.
pub mod action;

/// Demo scenario.
mod demo;

/// Engine state and tick.
pub mod engine;

/// Shared handle and background ticker.
pub mod runner;

pub use action::{Action, Outcome, Reply};
pub use demo::{DEMO_SEMAPHORE, DEMO_THREADS};
pub use engine::{Dispatch, Engine, TickReport, WaitOutcome};
pub use runner::{AutoRunner, SharedEngine};
