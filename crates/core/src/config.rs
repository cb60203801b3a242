//! Configuration system for the simulator.
//!
//! This module defines the configuration structure and enums used to parameterize
//! the engine. It provides:
//! 1. **Defaults:** Baseline values for the scheduler, quantum, core count and tick interval.
//! 2. **Enums:** Scheduling policy and the (informational) thread mapping model.
//! 3. **Loading:** JSON parsing with per-field defaults and validation.
//!
//! Configuration is supplied as JSON (a file or a request body), or use `Config::default()`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::SimError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Default round-robin time slice, in ticks.
    ///
    /// Two ticks keep a dispatched thread on its core across at least one tick boundary,
    /// which is when external `wait` calls can reach it.
    pub const QUANTUM: u64 = 2;

    /// Default number of simulated cores.
    pub const CORE_COUNT: usize = 2;

    /// Default auto-runner period in milliseconds (five ticks per second).
    pub const TICK_INTERVAL_MS: u64 = 200;

    /// Longest accepted auto-runner period: one day.
    pub const MAX_TICK_INTERVAL_MS: u64 = 86_400_000;
}

/// Scheduling policy applied when filling idle cores.
///
/// Serializes as `FCFS`, `RR` or `PRIORITY`; deserializes through [`FromStr`], so JSON
/// accepts the same spellings as runtime updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SchedulerKind {
    /// First-come-first-served: head of the ready queue, never preempted.
    #[serde(rename = "FCFS")]
    Fcfs,
    /// Round-robin: head of the ready queue, preempted after `quantum` ticks.
    #[default]
    #[serde(rename = "RR")]
    RoundRobin,
    /// Non-preemptive priority: lowest numeric priority first, ties by thread id.
    #[serde(rename = "PRIORITY")]
    Priority,
}

impl SchedulerKind {
    /// Canonical upper-case name (`FCFS`, `RR`, `PRIORITY`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::RoundRobin => "RR",
            Self::Priority => "PRIORITY",
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SchedulerKind {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for SchedulerKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FCFS" | "FIFO" => Ok(Self::Fcfs),
            "RR" | "ROUNDROBIN" | "ROUND_ROBIN" => Ok(Self::RoundRobin),
            "PRIORITY" | "PR" => Ok(Self::Priority),
            other => Err(SimError::InvalidValue(format!(
                "unknown scheduler `{other}` (expected FCFS, RR or PRIORITY)"
            ))),
        }
    }
}

/// Threading model being visualized.
///
/// Purely a label carried through to snapshots; the engine always schedules any ready
/// thread onto any idle core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum MappingModel {
    /// Many user threads multiplexed onto one kernel thread.
    ManyToOne,
    /// One kernel thread per user thread.
    OneToOne,
    /// Many user threads over a pool of kernel threads.
    #[default]
    ManyToMany,
}

impl MappingModel {
    /// Canonical name as it appears in snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManyToOne => "MANY_TO_ONE",
            Self::OneToOne => "ONE_TO_ONE",
            Self::ManyToMany => "MANY_TO_MANY",
        }
    }
}

impl fmt::Display for MappingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MappingModel {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for MappingModel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "MANY_TO_ONE" => Ok(Self::ManyToOne),
            "ONE_TO_ONE" => Ok(Self::OneToOne),
            "MANY_TO_MANY" => Ok(Self::ManyToMany),
            other => Err(SimError::InvalidValue(format!(
                "unknown model `{other}` (expected MANY_TO_ONE, ONE_TO_ONE or MANY_TO_MANY)"
            ))),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Threading model label.
    #[serde(default)]
    pub model: MappingModel,

    /// Active scheduling policy.
    #[serde(default)]
    pub scheduler: SchedulerKind,

    /// Round-robin time slice in ticks; ignored by FCFS and PRIORITY.
    #[serde(default = "Config::default_quantum")]
    pub quantum: u64,

    /// Number of simulated cores.
    #[serde(default = "Config::default_core_count")]
    pub core_count: usize,

    /// Period of the auto-runner, in milliseconds.
    #[serde(default = "Config::default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Config {
    /// Returns the default round-robin quantum.
    fn default_quantum() -> u64 {
        defaults::QUANTUM
    }

    /// Returns the default core count.
    fn default_core_count() -> usize {
        defaults::CORE_COUNT
    }

    /// Returns the default auto-runner period.
    fn default_tick_interval_ms() -> u64 {
        defaults::TICK_INTERVAL_MS
    }

    /// Parses and validates a configuration from a JSON document.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for malformed JSON or unknown enum names, and
    /// whatever [`Config::validate`] reports for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the file cannot be read, otherwise the same
    /// errors as [`Config::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Checks that every numeric field is in range.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidQuantum`] for a zero quantum, [`SimError::InvalidValue`] for a
    /// zero core count or a tick interval outside one millisecond to one day.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.quantum == 0 {
            return Err(SimError::InvalidQuantum(0));
        }
        if self.core_count == 0 {
            return Err(SimError::InvalidValue("core_count must be positive".into()));
        }
        if !(1..=defaults::MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(SimError::InvalidValue(format!(
                "tick_interval_ms must be in 1..={}, got {}",
                defaults::MAX_TICK_INTERVAL_MS,
                self.tick_interval_ms
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    /// Round-robin with a two-tick quantum on two cores, many-to-many model.
    fn default() -> Self {
        Self {
            model: MappingModel::default(),
            scheduler: SchedulerKind::default(),
            quantum: defaults::QUANTUM,
            core_count: defaults::CORE_COUNT,
            tick_interval_ms: defaults::TICK_INTERVAL_MS,
        }
    }
}

/// A partial configuration change, as applied by `Engine::set_config`.
///
/// Numeric fields are signed so that out-of-range requests can be reported as
/// `InvalidQuantum` / `InvalidValue` rather than failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// New model label.
    #[serde(default)]
    pub model: Option<MappingModel>,
    /// New scheduling policy.
    #[serde(default)]
    pub scheduler: Option<SchedulerKind>,
    /// New round-robin quantum.
    #[serde(default)]
    pub quantum: Option<i64>,
    /// New core count.
    #[serde(default)]
    pub core_count: Option<i64>,
}

impl ConfigUpdate {
    /// Builds an update from the loosely typed fields a transport receives.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidValue`] for an unknown model or scheduler name.
    pub fn from_names(
        model: Option<&str>,
        scheduler: Option<&str>,
        quantum: Option<i64>,
        core_count: Option<i64>,
    ) -> Result<Self, SimError> {
        Ok(Self {
            model: model.map(str::parse).transpose()?,
            scheduler: scheduler.map(str::parse).transpose()?,
            quantum,
            core_count,
        })
    }
}
