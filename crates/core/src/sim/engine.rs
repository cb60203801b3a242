//! The simulation engine.
//!
//! `Engine` owns every table (threads, cores, ready queue, primitives, statistics) and is
//! the only thing that mutates them. Each public method is one atomic action: it validates
//! everything it needs first and only then mutates, so an `Err` leaves the engine
//! untouched.
//!
//! One tick runs, in this order:
//! 1. **Dispatch:** idle cores, ascending id, each take the policy's pick from the ready queue.
//! 2. **Switch accounting:** a core now holding a different thread than last tick counts one
//!    context switch.
//! 3. **Execute:** every busy core, including ones filled in step 1, consumes one unit of
//!    its thread's work. Exhausted threads terminate; under RR, threads whose quantum has
//!    expired are preempted to the ready tail.
//! 4. **Clock:** the tick counter advances.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::{Entity, KernelId, SimError, ThreadId};
use crate::config::{Config, ConfigUpdate};
use crate::kernel::CoreSet;
use crate::sched::Scheduler;
use crate::snapshot::{KernelView, MonitorView, SemaphoreView, Snapshot, StatsView, ThreadView};
use crate::stats::SimStats;
use crate::sync::SyncRegistry;
use crate::sync::monitor::is_default_condition;
use crate::thread::{ThreadState, ThreadTable};

/// Result of a semaphore `wait`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    /// A permit was taken; the thread keeps running.
    Acquired,
    /// No permit; the thread is now blocked and its core is free.
    Blocked,
}

/// A thread placed on a core during a tick's dispatch pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Core that was filled.
    pub kernel: KernelId,
    /// Thread that was placed on it.
    pub thread: ThreadId,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number (1 for the first tick after a reset).
    pub tick: u64,
    /// Dispatches, in core order.
    pub dispatched: Vec<Dispatch>,
    /// Threads that terminated, in core order.
    pub completed: Vec<ThreadId>,
    /// Threads preempted by quantum expiry, in core order.
    pub preempted: Vec<ThreadId>,
}

/// The simulation engine.
#[derive(Debug)]
pub struct Engine {
    /// Configuration restored by `reset`.
    base: Config,
    config: Config,
    threads: ThreadTable,
    cores: CoreSet,
    scheduler: Scheduler,
    sync: SyncRegistry,
    stats: SimStats,
    running: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(Config::default())
    }
}

impl Engine {
    /// Creates an empty, paused engine.
    ///
    /// # Errors
    ///
    /// Whatever [`Config::validate`] rejects.
    pub fn new(config: Config) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        Self {
            cores: CoreSet::new(config.core_count),
            scheduler: Scheduler::new(config.scheduler),
            threads: ThreadTable::new(),
            sync: SyncRegistry::new(),
            stats: SimStats::default(),
            running: false,
            base: config.clone(),
            config,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Thread table.
    pub const fn threads(&self) -> &ThreadTable {
        &self.threads
    }

    /// Cores.
    pub const fn cores(&self) -> &CoreSet {
        &self.cores
    }

    /// Scheduler (ready queue and policy).
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Semaphores and monitors.
    pub const fn sync(&self) -> &SyncRegistry {
        &self.sync
    }

    /// Counters.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Ticks executed since the last reset.
    pub const fn tick(&self) -> u64 {
        self.stats.tick
    }

    /// Whether the auto-run flag is set.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// `true` while some thread is ready or running, i.e. another tick can make progress.
    pub fn has_runnable(&self) -> bool {
        !self.scheduler.ready().is_empty() || self.cores.busy_count() > 0
    }

    /// Captures the full engine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.stats.tick,
            running: self.running,
            threads: self.threads.iter().map(ThreadView::from).collect(),
            kernels: self.cores.iter().map(KernelView::from).collect(),
            ready_queue: self.scheduler.ready().iter().collect(),
            semaphores: self
                .sync
                .semaphores()
                .map(|s| (s.name().to_owned(), SemaphoreView::from(s)))
                .collect(),
            monitors: self
                .sync
                .monitors()
                .map(|m| (m.name().to_owned(), MonitorView::from(m)))
                .collect(),
            stats: StatsView {
                completed: self.stats.completed,
                context_switches: self.stats.context_switches,
                preemptions: self.stats.preemptions,
                utilization: self.stats.utilization(),
                avg_turnaround: SimStats::avg_turnaround(&self.threads),
                avg_waiting: SimStats::avg_waiting(&self.threads),
            },
            model: self.config.model,
            scheduler: self.scheduler.kind(),
            quantum: self.config.quantum,
            core_count: self.cores.len(),
        }
    }

    /// Sets the auto-run flag.
    pub fn start(&mut self) {
        if !self.running {
            info!(tick = self.stats.tick, "simulation started");
        }
        self.running = true;
    }

    /// Clears the auto-run flag.
    pub fn pause(&mut self) {
        if self.running {
            info!(tick = self.stats.tick, "simulation paused");
        }
        self.running = false;
    }

    /// Runs exactly one tick, regardless of the auto-run flag.
    pub fn step(&mut self) -> TickReport {
        let now = self.stats.tick + 1;
        let mut report = TickReport {
            tick: now,
            ..TickReport::default()
        };

        for kid in self.cores.idle_ids() {
            let Some(id) = self.scheduler.pick_next(&self.threads) else {
                break;
            };
            if let (Some(thread), Some(kernel)) = (self.threads.get_mut(id), self.cores.get_mut(kid))
            {
                thread.dispatch(kid, now);
                kernel.assign(id);
                debug!(tick = now, thread = %id, core = %kid, "dispatch");
                report.dispatched.push(Dispatch {
                    kernel: kid,
                    thread: id,
                });
            }
        }

        for kernel in self.cores.iter_mut() {
            if kernel.note_occupant() {
                self.stats.context_switches += 1;
            }
        }

        let quantum = self.config.quantum;
        for kernel in self.cores.iter_mut() {
            let Some(id) = kernel.current_thread() else {
                self.stats.idle_core_ticks += 1;
                continue;
            };
            let Some(thread) = self.threads.get_mut(id) else {
                continue;
            };
            kernel.record_busy_tick();
            self.stats.busy_core_ticks += 1;

            if thread.execute_unit() {
                thread.terminate(now);
                let _ = kernel.release();
                self.stats.completed += 1;
                debug!(tick = now, thread = %id, core = %kernel.id(), "terminated");
                report.completed.push(id);
            } else if self.scheduler.should_preempt(thread.run_ticks(), quantum) {
                thread.preempt();
                let _ = kernel.release();
                self.scheduler.enqueue(id);
                self.stats.preemptions += 1;
                debug!(tick = now, thread = %id, core = %kernel.id(), "quantum expired");
                report.preempted.push(id);
            }
        }

        self.stats.tick = now;
        report
    }

    /// Runs one tick only if the auto-run flag is set. This is what timed drivers call.
    pub fn tick_if_running(&mut self) -> Option<TickReport> {
        if self.running { Some(self.step()) } else { None }
    }

    /// Steps until no thread is ready or running, or `max_ticks` ticks have run.
    ///
    /// Returns the number of ticks executed. Threads left blocked stay blocked.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && self.has_runnable() {
            let _ = self.step();
            ran += 1;
        }
        ran
    }

    /// Clears every thread, core binding, primitive and counter, and restores the
    /// configuration the engine was created with. Thread ids restart at 1.
    pub fn reset(&mut self) {
        self.config = self.base.clone();
        self.threads.clear();
        self.cores = CoreSet::new(self.config.core_count);
        self.scheduler.clear();
        self.scheduler.set_policy(self.config.scheduler);
        self.sync.clear();
        self.stats = SimStats::default();
        self.running = false;
        info!("simulation reset");
    }

    /// Creates a `READY` thread at the tail of the ready queue.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidBurst`] if `burst <= 0`.
    pub fn add_thread(
        &mut self,
        name: Option<String>,
        burst: i64,
        priority: i32,
    ) -> Result<ThreadId, SimError> {
        let units = u64::try_from(burst)
            .ok()
            .filter(|&b| b > 0)
            .ok_or(SimError::InvalidBurst(burst))?;
        Ok(self.spawn_ready(name, units, priority))
    }

    pub(crate) fn spawn_ready(&mut self, name: Option<String>, burst: u64, priority: i32) -> ThreadId {
        let id = self.threads.spawn(name, burst, priority, self.stats.tick);
        self.scheduler.enqueue(id);
        debug!(thread = %id, burst, priority, "thread created");
        id
    }

    /// Applies a partial configuration change.
    ///
    /// Changing the policy keeps the ready queue as it is. Shrinking the core set moves
    /// threads on removed cores back to the ready tail, in core order.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidQuantum`] for a quantum `<= 0`, [`SimError::InvalidValue`] for a
    /// core count `<= 0`. Nothing is applied on error.
    pub fn set_config(&mut self, update: ConfigUpdate) -> Result<(), SimError> {
        let quantum = update
            .quantum
            .map(|q| u64::try_from(q).ok().filter(|&q| q > 0).ok_or(SimError::InvalidQuantum(q)))
            .transpose()?;
        let core_count = update
            .core_count
            .map(|c| {
                usize::try_from(c).ok().filter(|&c| c > 0).ok_or_else(|| {
                    SimError::InvalidValue(format!("core_count must be positive, got {c}"))
                })
            })
            .transpose()?;

        if let Some(model) = update.model {
            self.config.model = model;
        }
        if let Some(kind) = update.scheduler {
            self.config.scheduler = kind;
            self.scheduler.set_policy(kind);
        }
        if let Some(q) = quantum {
            self.config.quantum = q;
        }
        if let Some(count) = core_count {
            self.config.core_count = count;
            for id in self.cores.resize(count) {
                if let Some(thread) = self.threads.get_mut(id) {
                    thread.preempt();
                    self.scheduler.enqueue(id);
                }
            }
        }
        info!(
            model = %self.config.model,
            scheduler = %self.config.scheduler,
            quantum = self.config.quantum,
            cores = self.config.core_count,
            "configuration updated"
        );
        Ok(())
    }

    /// Creates a semaphore.
    ///
    /// # Errors
    ///
    /// See [`SyncRegistry::create_semaphore`].
    pub fn create_semaphore(&mut self, name: &str, initial: i64) -> Result<(), SimError> {
        let _ = self.sync.create_semaphore(name, initial)?;
        debug!(semaphore = name, initial, "semaphore created");
        Ok(())
    }

    /// `wait` (P) on a semaphore by a running thread.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown semaphore or thread,
    /// [`SimError::InvalidStateTransition`] if the thread is not running.
    pub fn semaphore_wait(&mut self, name: &str, thread: ThreadId) -> Result<WaitOutcome, SimError> {
        let _ = self.sync.semaphore(name)?;
        self.threads
            .require(thread)?
            .ensure_state(ThreadState::Running, "wait")?;

        let semaphore = self.sync.semaphore_mut(name)?;
        if semaphore.try_acquire() {
            debug!(semaphore = name, thread = %thread, value = semaphore.value(), "acquired");
            return Ok(WaitOutcome::Acquired);
        }
        semaphore.enqueue(thread);
        self.block_running(thread);
        debug!(semaphore = name, thread = %thread, "blocked");
        Ok(WaitOutcome::Blocked)
    }

    /// `signal` (V) on a semaphore. Returns the thread that was woken, if any.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown semaphore.
    pub fn semaphore_signal(&mut self, name: &str) -> Result<Option<ThreadId>, SimError> {
        let woken = self.sync.semaphore_mut(name)?.release();
        if let Some(id) = woken {
            self.wake(id);
        }
        debug!(semaphore = name, woken = ?woken, "signal");
        Ok(woken)
    }

    /// Creates a monitor.
    ///
    /// # Errors
    ///
    /// See [`SyncRegistry::create_monitor`].
    pub fn create_monitor(&mut self, name: &str) -> Result<(), SimError> {
        let _ = self.sync.create_monitor(name)?;
        debug!(monitor = name, "monitor created");
        Ok(())
    }

    /// Blocks a running thread on a monitor's condition.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown monitor, condition or thread,
    /// [`SimError::InvalidStateTransition`] if the thread is not running.
    pub fn monitor_wait(
        &mut self,
        name: &str,
        thread: ThreadId,
        cond: Option<&str>,
    ) -> Result<(), SimError> {
        let _ = self.sync.monitor(name)?;
        check_condition(name, cond)?;
        self.threads
            .require(thread)?
            .ensure_state(ThreadState::Running, "wait")?;

        self.sync.monitor_mut(name)?.wait(thread);
        self.block_running(thread);
        debug!(monitor = name, thread = %thread, "waiting");
        Ok(())
    }

    /// Wakes the head waiter of a monitor's condition, if any.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown monitor or condition.
    pub fn monitor_signal(
        &mut self,
        name: &str,
        cond: Option<&str>,
    ) -> Result<Option<ThreadId>, SimError> {
        let _ = self.sync.monitor(name)?;
        check_condition(name, cond)?;
        let woken = self.sync.monitor_mut(name)?.signal();
        if let Some(id) = woken {
            self.wake(id);
        }
        debug!(monitor = name, woken = ?woken, "signal");
        Ok(woken)
    }

    /// Wakes every waiter of a monitor's condition, in wait order.
    ///
    /// # Errors
    ///
    /// [`SimError::NotFound`] for an unknown monitor or condition.
    pub fn monitor_broadcast(
        &mut self,
        name: &str,
        cond: Option<&str>,
    ) -> Result<Vec<ThreadId>, SimError> {
        let _ = self.sync.monitor(name)?;
        check_condition(name, cond)?;
        let woken = self.sync.monitor_mut(name)?.broadcast();
        for &id in &woken {
            self.wake(id);
        }
        debug!(monitor = name, woken = woken.len(), "broadcast");
        Ok(woken)
    }

    /// `RUNNING -> BLOCKED`, freeing the thread's core.
    fn block_running(&mut self, id: ThreadId) {
        if let Some(thread) = self.threads.get_mut(id) {
            if let Some(kernel) = thread.mapped_kernel().and_then(|k| self.cores.get_mut(k)) {
                let _ = kernel.release();
            }
            thread.block();
        }
    }

    /// `BLOCKED -> READY`, appending to the ready tail.
    fn wake(&mut self, id: ThreadId) {
        if let Some(thread) = self.threads.get_mut(id) {
            thread.wake();
            self.scheduler.enqueue(id);
        }
    }
}

fn check_condition(monitor: &str, cond: Option<&str>) -> Result<(), SimError> {
    if is_default_condition(cond) {
        Ok(())
    } else {
        Err(SimError::NotFound {
            entity: Entity::Condition,
            key: format!("{monitor}.{}", cond.unwrap_or_default()),
        })
    }
}
