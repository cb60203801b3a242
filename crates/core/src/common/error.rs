//! Error definitions for engine operations.
//!
//! This module defines how rejected actions are reported. It provides:
//! 1. **Error Representation:** `SimError`, one variant per failure class.
//! 2. **Classification:** `ErrorKind`, a flat, serializable discriminant for transports.
//! 3. **Reporting:** `ErrorReport`, the `{kind, message}` pair handed back to callers.
//!
//! No error is fatal to the engine. Every operation validates before it mutates, so a
//! rejected action leaves the engine exactly as it was.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::ThreadId;
use crate::thread::ThreadState;

/// The kind of named entity an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    /// A simulated thread, keyed by id.
    Thread,
    /// A counting semaphore, keyed by name.
    Semaphore,
    /// A monitor, keyed by name.
    Monitor,
    /// A condition queue inside a monitor.
    Condition,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Thread => write!(f, "thread"),
            Entity::Semaphore => write!(f, "semaphore"),
            Entity::Monitor => write!(f, "monitor"),
            Entity::Condition => write!(f, "condition"),
        }
    }
}

/// Errors returned by engine operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// Unknown thread id, semaphore name, monitor name or condition.
    #[error("{entity} `{key}` not found")]
    NotFound {
        /// What kind of entity was looked up.
        entity: Entity,
        /// The id or name that did not resolve.
        key: String,
    },

    /// A create call named an entity that already exists.
    #[error("{entity} `{name}` already exists")]
    DuplicateName {
        /// What kind of entity was being created.
        entity: Entity,
        /// The name already in use.
        name: String,
    },

    /// A numeric or textual argument was out of range.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A thread was requested with a non-positive burst.
    #[error("burst must be positive, got {0}")]
    InvalidBurst(i64),

    /// The round-robin quantum was not positive.
    #[error("quantum must be positive, got {0}")]
    InvalidQuantum(i64),

    /// The operation requires the thread to be in a different state.
    #[error("cannot {op} thread {thread}: it is {actual}, expected {expected}")]
    InvalidStateTransition {
        /// The thread the operation targeted.
        thread: ThreadId,
        /// Short name of the rejected operation (e.g. `wait`).
        op: &'static str,
        /// State the thread was found in.
        actual: ThreadState,
        /// State the operation requires.
        expected: ThreadState,
    },

    /// A configuration document could not be read or parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// Shorthand for a thread lookup failure.
    pub fn thread_not_found(id: ThreadId) -> Self {
        Self::NotFound {
            entity: Entity::Thread,
            key: id.to_string(),
        }
    }

    /// Returns the flat classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::InvalidValue(_) => ErrorKind::InvalidValue,
            Self::InvalidBurst(_) => ErrorKind::InvalidBurst,
            Self::InvalidQuantum(_) => ErrorKind::InvalidQuantum,
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}

/// Serializable discriminant of a [`SimError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`SimError::NotFound`].
    NotFound,
    /// See [`SimError::DuplicateName`].
    DuplicateName,
    /// See [`SimError::InvalidValue`].
    InvalidValue,
    /// See [`SimError::InvalidBurst`].
    InvalidBurst,
    /// See [`SimError::InvalidQuantum`].
    InvalidQuantum,
    /// See [`SimError::InvalidStateTransition`].
    InvalidStateTransition,
    /// See [`SimError::InvalidConfig`].
    InvalidConfig,
}

/// Structured failure returned across the action boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Failure class.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl From<&SimError> for ErrorReport {
    fn from(err: &SimError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
