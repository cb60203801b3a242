//! Shared engine handle and timed driver.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::snapshot::Snapshot;

use super::action::{Action, Reply};
use super::engine::Engine;

/// Cloneable handle to one engine, shared between request handlers and the ticker.
///
/// Every call takes the lock for its whole duration, so ticks and actions never
/// interleave.
#[derive(Clone, Debug, Default)]
pub struct SharedEngine(Arc<Mutex<Engine>>);

impl SharedEngine {
    /// Wraps an engine.
    pub fn new(engine: Engine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    /// Locks the engine. A poisoned lock is recovered: no engine method panics midway.
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one action under the lock.
    pub fn handle(&self, action: Action) -> Reply {
        self.lock().handle(action)
    }

    /// Takes a snapshot under the lock.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }
}

/// Background thread that ticks the engine every `interval` while its auto-run flag is set.
///
/// Dropping the runner stops and joins the thread.
#[derive(Debug)]
pub struct AutoRunner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AutoRunner {
    /// Starts the ticker thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(engine: SharedEngine, interval: Duration) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("threadsim-ticker".into())
            .spawn(move || {
                info!(?interval, "auto-runner started");
                // `None` means the interval overflows the clock: sleep until stopped.
                let mut deadline = Instant::now().checked_add(interval);
                while !flag.load(Ordering::Acquire) {
                    let now = Instant::now();
                    match deadline {
                        None => {
                            thread::park();
                            continue;
                        }
                        Some(at) if now < at => {
                            thread::park_timeout(at - now);
                            continue;
                        }
                        Some(_) => {}
                    }
                    deadline = now.checked_add(interval);
                    if let Some(report) = engine.lock().tick_if_running() {
                        debug!(tick = report.tick, "auto tick");
                    }
                }
                info!("auto-runner stopped");
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the ticker thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread and waits for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("auto-runner thread panicked");
            }
        }
    }
}

impl Drop for AutoRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
