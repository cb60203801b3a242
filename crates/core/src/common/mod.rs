//! Common types used throughout the simulator.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Identifiers:** Strong types for thread and kernel ids.
//! 2. **Error Handling:** The `SimError` taxonomy and its serializable report form.

/// Thread and kernel identifiers.
pub mod ids;

/// Error types reported by engine operations.
pub mod error;

pub use error::{Entity, ErrorKind, ErrorReport, SimError};
pub use ids::{KernelId, ThreadId};
