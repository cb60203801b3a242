//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters the engine updates every tick. It provides:
//! 1. **Time:** The tick counter.
//! 2. **Throughput:** Completed threads and preemptions.
//! 3. **Switching:** Context switches per the occupant-change rule.
//! 4. **Utilization:** Busy vs idle core-ticks.
//! 5. **Latency:** Average turnaround and waiting time of terminated threads.

use serde::{Deserialize, Serialize};

use crate::thread::{ThreadState, ThreadTable};

/// Engine-wide counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStats {
    /// Ticks executed since the last reset.
    pub tick: u64,
    /// Threads that reached `TERMINATED`.
    pub completed: u64,
    /// Ticks on which some core was taken by a different thread than the previous tick.
    pub context_switches: u64,
    /// Round-robin quantum expiries that sent a thread back to the ready queue.
    pub preemptions: u64,
    /// Core-ticks spent executing work.
    pub busy_core_ticks: u64,
    /// Core-ticks spent idle.
    pub idle_core_ticks: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"cores"`, `"threads"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "cores", "threads"];

impl SimStats {
    /// Fraction of core-ticks spent executing, in `[0, 1]`; zero before the first tick.
    pub fn utilization(&self) -> f64 {
        let total = self.busy_core_ticks + self.idle_core_ticks;
        if total == 0 {
            0.0
        } else {
            self.busy_core_ticks as f64 / total as f64
        }
    }

    /// Mean turnaround of terminated threads, or `None` if nothing has finished.
    pub fn avg_turnaround(threads: &ThreadTable) -> Option<f64> {
        mean(threads.iter().filter_map(crate::thread::Thread::turnaround))
    }

    /// Mean waiting time of terminated threads, or `None` if nothing has finished.
    pub fn avg_waiting(threads: &ThreadTable) -> Option<f64> {
        mean(threads.iter().filter_map(crate::thread::Thread::waiting_time))
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; pass an empty slice
    /// to print everything.
    pub fn print_sections(&self, threads: &ThreadTable, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("summary") {
            println!("\n==========================================================");
            println!("THREAD SCHEDULING SIMULATION STATISTICS");
            println!("==========================================================");
            println!("sim_ticks                {}", self.tick);
            println!("threads.total            {}", threads.len());
            println!("threads.completed        {}", self.completed);
            println!("context_switches         {}", self.context_switches);
            println!("preemptions              {}", self.preemptions);
            println!("----------------------------------------------------------");
        }
        if want("cores") {
            println!("CORE UTILIZATION");
            println!("  core_ticks.busy        {}", self.busy_core_ticks);
            println!("  core_ticks.idle        {}", self.idle_core_ticks);
            println!("  utilization            {:.2}%", self.utilization() * 100.0);
            println!("----------------------------------------------------------");
        }
        if want("threads") {
            println!("THREAD STATES");
            for state in [
                ThreadState::Ready,
                ThreadState::Running,
                ThreadState::Blocked,
                ThreadState::Terminated,
            ] {
                println!(
                    "  {:<22} {}",
                    format!("state.{}", state.to_string().to_lowercase()),
                    threads.count_in(state)
                );
            }
            match Self::avg_turnaround(threads) {
                Some(t) => println!("  avg_turnaround         {t:.2} ticks"),
                None => println!("  avg_turnaround         n/a"),
            }
            match Self::avg_waiting(threads) {
                Some(w) => println!("  avg_waiting            {w:.2} ticks"),
                None => println!("  avg_waiting            n/a"),
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(threads, &[])`.
    pub fn print(&self, threads: &ThreadTable) {
        self.print_sections(threads, &[]);
    }
}

fn mean(values: impl Iterator<Item = u64>) -> Option<f64> {
    let (sum, n) = values.fold((0u64, 0u64), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}
