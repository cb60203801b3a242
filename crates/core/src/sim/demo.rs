use tracing::{info, warn};

use super::Engine;

/// Threads created by [`Engine::init_demo`], as `(name, burst, priority)`.
pub const DEMO_THREADS: [(&str, u64, i32); 4] = [
    ("Producer", 6, 2),
    ("Consumer", 4, 1),
    ("Logger", 3, 3),
    ("Worker", 5, 2),
];

/// Semaphore created by [`Engine::init_demo`], as `(name, initial)`.
pub const DEMO_SEMAPHORE: (&str, i64) = ("mutex", 1);

impl Engine {
    /// Resets, then loads the demo scenario: four ready threads (ids 1 to 4) and a binary
    /// semaphore named `mutex`. The resulting state is the same on every call.
    pub fn init_demo(&mut self) {
        self.reset();
        for (name, burst, priority) in DEMO_THREADS {
            let _ = self.spawn_ready(Some(name.to_owned()), burst, priority);
        }
        let (name, initial) = DEMO_SEMAPHORE;
        if let Err(e) = self.create_semaphore(name, initial) {
            warn!(error = %e, "demo semaphore not created");
        }
        info!(threads = DEMO_THREADS.len(), "demo scenario loaded");
    }
}
