//! Serializable request boundary.
//!
//! Transports deserialize an [`Action`] (`{"action": "add_thread", "burst": 5}`), feed it to
//! [`Engine::handle`] and serialize the [`Reply`]. Every reply, successful or not, carries
//! the state after the action, so a client never needs a second round trip.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{ErrorReport, SimError, ThreadId};
use crate::config::ConfigUpdate;
use crate::snapshot::Snapshot;

use super::engine::{Engine, TickReport, WaitOutcome};

const fn default_burst() -> i64 {
    10
}

/// One external request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Read the current state.
    GetState,
    /// Set the auto-run flag.
    Start,
    /// Clear the auto-run flag.
    Pause,
    /// Run exactly one tick.
    Step,
    /// Clear everything.
    Reset,
    /// Reset and load the demo scenario.
    InitDemo,
    /// Create a thread.
    AddThread {
        /// Display name; defaults to `T{id}`.
        #[serde(default)]
        name: Option<String>,
        /// Work units.
        #[serde(default = "default_burst")]
        burst: i64,
        /// Priority, lower is more urgent.
        #[serde(default)]
        priority: i32,
    },
    /// Change model, policy, quantum or core count.
    SetConfig {
        /// Model name.
        #[serde(default)]
        model: Option<String>,
        /// Scheduler name.
        #[serde(default)]
        scheduler: Option<String>,
        /// Round-robin quantum.
        #[serde(default)]
        quantum: Option<i64>,
        /// Core count.
        #[serde(default)]
        core_count: Option<i64>,
    },
    /// Create a semaphore.
    #[serde(alias = "semaphore.create")]
    SemaphoreCreate {
        /// Semaphore name.
        name: String,
        /// Initial permits.
        #[serde(default)]
        initial: i64,
    },
    /// P operation.
    #[serde(alias = "semaphore.wait")]
    SemaphoreWait {
        /// Semaphore name.
        name: String,
        /// Calling thread.
        thread_id: ThreadId,
    },
    /// V operation.
    #[serde(alias = "semaphore.signal")]
    SemaphoreSignal {
        /// Semaphore name.
        name: String,
    },
    /// Create a monitor.
    #[serde(alias = "monitor.create")]
    MonitorCreate {
        /// Monitor name.
        name: String,
    },
    /// Wait on a monitor condition.
    #[serde(alias = "monitor.wait")]
    MonitorWait {
        /// Monitor name.
        name: String,
        /// Calling thread.
        thread_id: ThreadId,
        /// Condition; only `default` exists.
        #[serde(default)]
        cond: Option<String>,
    },
    /// Wake one waiter.
    #[serde(alias = "monitor.signal")]
    MonitorSignal {
        /// Monitor name.
        name: String,
        /// Condition; only `default` exists.
        #[serde(default)]
        cond: Option<String>,
    },
    /// Wake every waiter.
    #[serde(alias = "monitor.broadcast")]
    MonitorBroadcast {
        /// Monitor name.
        name: String,
        /// Condition; only `default` exists.
        #[serde(default)]
        cond: Option<String>,
    },
}

/// Action-specific part of a successful reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing beyond the new state.
    Ack,
    /// A tick ran.
    Tick(TickReport),
    /// A thread was created.
    ThreadCreated {
        /// Id of the new thread.
        thread_id: ThreadId,
    },
    /// Result of a semaphore wait.
    Wait {
        /// Thread that waited.
        thread_id: ThreadId,
        /// Whether it acquired or blocked.
        result: WaitOutcome,
    },
    /// Threads woken by a signal or broadcast, in wake order.
    Woken {
        /// Woken ids; empty when nobody was waiting.
        threads: Vec<ThreadId>,
    },
}

/// Response to one [`Action`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// `true` if the action was applied.
    pub ok: bool,
    /// Present when `ok`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Present when not `ok`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    /// State after the action.
    pub state: Snapshot,
}

impl Engine {
    /// Applies one action.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation rejects; the engine is unchanged in that case.
    pub fn apply(&mut self, action: Action) -> Result<Outcome, SimError> {
        let outcome = match action {
            Action::GetState => Outcome::Ack,
            Action::Start => {
                self.start();
                Outcome::Ack
            }
            Action::Pause => {
                self.pause();
                Outcome::Ack
            }
            Action::Step => Outcome::Tick(self.step()),
            Action::Reset => {
                self.reset();
                Outcome::Ack
            }
            Action::InitDemo => {
                self.init_demo();
                Outcome::Ack
            }
            Action::AddThread {
                name,
                burst,
                priority,
            } => Outcome::ThreadCreated {
                thread_id: self.add_thread(name, burst, priority)?,
            },
            Action::SetConfig {
                model,
                scheduler,
                quantum,
                core_count,
            } => {
                let update = ConfigUpdate::from_names(
                    model.as_deref(),
                    scheduler.as_deref(),
                    quantum,
                    core_count,
                )?;
                self.set_config(update)?;
                Outcome::Ack
            }
            Action::SemaphoreCreate { name, initial } => {
                self.create_semaphore(&name, initial)?;
                Outcome::Ack
            }
            Action::SemaphoreWait { name, thread_id } => Outcome::Wait {
                thread_id,
                result: self.semaphore_wait(&name, thread_id)?,
            },
            Action::SemaphoreSignal { name } => Outcome::Woken {
                threads: self.semaphore_signal(&name)?.into_iter().collect(),
            },
            Action::MonitorCreate { name } => {
                self.create_monitor(&name)?;
                Outcome::Ack
            }
            Action::MonitorWait {
                name,
                thread_id,
                cond,
            } => {
                self.monitor_wait(&name, thread_id, cond.as_deref())?;
                Outcome::Ack
            }
            Action::MonitorSignal { name, cond } => Outcome::Woken {
                threads: self
                    .monitor_signal(&name, cond.as_deref())?
                    .into_iter()
                    .collect(),
            },
            Action::MonitorBroadcast { name, cond } => Outcome::Woken {
                threads: self.monitor_broadcast(&name, cond.as_deref())?,
            },
        };
        Ok(outcome)
    }

    /// Applies one action and packages the result with a fresh snapshot.
    pub fn handle(&mut self, action: Action) -> Reply {
        match self.apply(action) {
            Ok(outcome) => Reply {
                ok: true,
                outcome: Some(outcome),
                error: None,
                state: self.snapshot(),
            },
            Err(e) => {
                warn!(error = %e, "action rejected");
                Reply {
                    ok: false,
                    outcome: None,
                    error: Some(ErrorReport::from(&e)),
                    state: self.snapshot(),
                }
            }
        }
    }
}
