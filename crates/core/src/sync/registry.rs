//! Name-keyed storage for semaphores and monitors.
//!
//! Lookups never create entities: a missing name is always `NotFound`, and a create on an
//! existing name is always `DuplicateName`. Semaphores and monitors have separate
//! namespaces.

use std::collections::BTreeMap;

use crate::common::{Entity, SimError};

use super::{Monitor, Semaphore};

/// Owner of every synchronization primitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncRegistry {
    semaphores: BTreeMap<String, Semaphore>,
    monitors: BTreeMap<String, Monitor>,
}

fn validate_name(name: &str) -> Result<(), SimError> {
    if name.trim().is_empty() {
        Err(SimError::InvalidValue("name must not be empty".into()))
    } else {
        Ok(())
    }
}

impl SyncRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            semaphores: BTreeMap::new(),
            monitors: BTreeMap::new(),
        }
    }

    /// Registers a semaphore with `initial` permits.
    ///
    /// # Errors
    ///
    /// [`SimError::DuplicateName`] if the name is taken, [`SimError::InvalidValue`] for an
    /// empty name or a negative initial value.
    pub fn create_semaphore(&mut self, name: &str, initial: i64) -> Result<&Semaphore, SimError> {
        validate_name(name)?;
        if self.semaphores.contains_key(name) {
            return Err(SimError::DuplicateName {
                entity: Entity::Semaphore,
                name: name.to_owned(),
            });
        }
        let value = u64::try_from(initial).map_err(|_| {
            SimError::InvalidValue(format!("semaphore initial value must be >= 0, got {initial}"))
        })?;
        let semaphore = self
            .semaphores
            .entry(name.to_owned())
            .or_insert_with(|| Semaphore::new(name, value));
        Ok(&*semaphore)
    }

    /// Registers a monitor.
    ///
    /// # Errors
    ///
    /// [`SimError::DuplicateName`] if the name is taken, [`SimError::InvalidValue`] for an
    /// empty name.
    pub fn create_monitor(&mut self, name: &str) -> Result<&Monitor, SimError> {
        validate_name(name)?;
        if self.monitors.contains_key(name) {
            return Err(SimError::DuplicateName {
                entity: Entity::Monitor,
                name: name.to_owned(),
            });
        }
        let monitor = self
            .monitors
            .entry(name.to_owned())
            .or_insert_with(|| Monitor::new(name));
        Ok(&*monitor)
    }

    /// Looks up a semaphore.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown name.
    pub fn semaphore(&self, name: &str) -> Result<&Semaphore, SimError> {
        self.semaphores.get(name).ok_or_else(|| SimError::NotFound {
            entity: Entity::Semaphore,
            key: name.to_owned(),
        })
    }

    pub(crate) fn semaphore_mut(&mut self, name: &str) -> Result<&mut Semaphore, SimError> {
        self.semaphores.get_mut(name).ok_or_else(|| SimError::NotFound {
            entity: Entity::Semaphore,
            key: name.to_owned(),
        })
    }

    /// Looks up a monitor.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown name.
    pub fn monitor(&self, name: &str) -> Result<&Monitor, SimError> {
        self.monitors.get(name).ok_or_else(|| SimError::NotFound {
            entity: Entity::Monitor,
            key: name.to_owned(),
        })
    }

    pub(crate) fn monitor_mut(&mut self, name: &str) -> Result<&mut Monitor, SimError> {
        self.monitors.get_mut(name).ok_or_else(|| SimError::NotFound {
            entity: Entity::Monitor,
            key: name.to_owned(),
        })
    }

    /// Semaphores in name order.
    pub fn semaphores(&self) -> impl Iterator<Item = &Semaphore> {
        self.semaphores.values()
    }

    /// Monitors in name order.
    pub fn monitors(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.values()
    }

    /// Drops every primitive.
    pub fn clear(&mut self) {
        self.semaphores.clear();
        self.monitors.clear();
    }
}
