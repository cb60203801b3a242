//! Thread scheduling simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It performs:
//! 1. **Demo:** Seed the four-thread demo scenario and run it to completion.
//! 2. **Run:** Build an engine from a config file and flags, add threads, and step it
//!    manually or through the timed auto-runner.
//! 3. **Script:** Apply a JSON array of actions and print one reply per line.
//!
//! Logs go to stderr (filter with `RUST_LOG`); stdout carries reports and JSON only.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{fmt, fs, process, thread};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use threadsim_core::config::ConfigUpdate;
use threadsim_core::sim::{Action, AutoRunner, SharedEngine, TickReport};
use threadsim_core::{Config, Engine};

/// Upper bound on ticks when `--ticks` is not given.
const DEFAULT_MAX_TICKS: u64 = 10_000;

#[derive(Parser, Debug)]
#[command(
    name = "threadsim",
    author,
    version,
    about = "Deterministic OS thread scheduling and synchronization simulator",
    long_about = "Simulate threads on a set of cores under FCFS, RR or PRIORITY scheduling, with \
                  counting semaphores and monitors.\n\nExamples:\n  threadsim demo\n  threadsim \
                  run --scheduler PRIORITY --cores 1 -t A:5:2 -t B:3:0\n  threadsim script \
                  actions.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the built-in demo scenario (Producer, Consumer, Logger, Worker) to completion.
    Demo {
        /// Stop after this many ticks even if threads remain.
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        ticks: u64,

        /// Print the final state as JSON instead of the stats report.
        #[arg(long)]
        json: bool,
    },

    /// Build an engine from a config and thread list, then run it.
    Run {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scheduling policy (FCFS, RR, PRIORITY).
        #[arg(short, long)]
        scheduler: Option<String>,

        /// Round-robin quantum in ticks.
        #[arg(short, long, allow_negative_numbers = true)]
        quantum: Option<i64>,

        /// Number of cores.
        #[arg(long, allow_negative_numbers = true)]
        cores: Option<i64>,

        /// Thread to create, as NAME:BURST[:PRIORITY]. Repeatable.
        #[arg(short = 't', long = "thread")]
        threads: Vec<ThreadSpec>,

        /// Stop after this many ticks even if threads remain.
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        ticks: u64,

        /// Drive ticks from the background auto-runner at the configured interval.
        #[arg(long)]
        auto: bool,

        /// Stats sections to print (summary, cores, threads). Defaults to all.
        #[arg(long, value_delimiter = ',')]
        stats: Vec<String>,
    },

    /// Apply a JSON array of actions, printing one reply per line.
    Script {
        /// Path to the action file.
        path: PathBuf,
    },
}

/// A thread given on the command line.
#[derive(Clone, Debug)]
struct ThreadSpec {
    name: String,
    burst: i64,
    priority: i32,
}

impl FromStr for ThreadSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts
            .next()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| format!("`{s}`: missing thread name"))?;
        let burst = parts
            .next()
            .ok_or_else(|| format!("`{s}`: missing burst (expected NAME:BURST[:PRIORITY])"))?
            .parse()
            .map_err(|e| format!("`{s}`: bad burst: {e}"))?;
        let priority = parts
            .next()
            .map_or(Ok(0), str::parse)
            .map_err(|e| format!("`{s}`: bad priority: {e}"))?;
        if parts.next().is_some() {
            return Err(format!("`{s}`: too many fields"));
        }
        Ok(Self {
            name: name.to_owned(),
            burst,
            priority,
        })
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { ticks, json } => cmd_demo(ticks, json),
        Commands::Run {
            config,
            scheduler,
            quantum,
            cores,
            threads,
            ticks,
            auto,
            stats,
        } => {
            let engine = build_engine(config, scheduler, quantum, cores, &threads);
            if auto {
                cmd_run_auto(engine, ticks, &stats);
            } else {
                cmd_run_stepped(engine, ticks, &stats);
            }
        }
        Commands::Script { path } => cmd_script(&path),
    }
}

/// Prints `msg` to stderr and exits with status 1.
fn fail(msg: impl fmt::Display) -> ! {
    error!("{msg}");
    eprintln!("Error: {msg}");
    process::exit(1);
}

/// Seeds the demo and runs it until every thread is done or `ticks` is reached.
fn cmd_demo(ticks: u64, json: bool) {
    let mut engine = Engine::default();
    engine.init_demo();
    let ran = engine.run_until_idle(ticks);
    info!(ticks = ran, "demo finished");

    if json {
        match engine.snapshot().to_json() {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        }
    } else {
        engine.stats().print(engine.threads());
    }
}

/// Creates the engine from an optional config file, flag overrides and threads.
///
/// Exits with status 1 on any invalid input.
///
/// # Arguments
///
/// * `config` - Optional JSON config path; defaults apply otherwise.
/// * `scheduler`, `quantum`, `cores` - Overrides applied after the file.
/// * `threads` - Threads created in order, so ids follow the command line.
fn build_engine(
    config: Option<PathBuf>,
    scheduler: Option<String>,
    quantum: Option<i64>,
    cores: Option<i64>,
    threads: &[ThreadSpec],
) -> Engine {
    let base = config.map_or_else(|| Ok(Config::default()), Config::from_path);
    let mut engine = base.and_then(Engine::new).unwrap_or_else(|e| fail(e));

    let update = ConfigUpdate::from_names(None, scheduler.as_deref(), quantum, cores)
        .unwrap_or_else(|e| fail(e));
    engine.set_config(update).unwrap_or_else(|e| fail(e));

    for spec in threads {
        let _ = engine
            .add_thread(Some(spec.name.clone()), spec.burst, spec.priority)
            .unwrap_or_else(|e| fail(e));
    }

    let cfg = engine.config();
    println!(
        "Configuration: scheduler={} quantum={} cores={} model={}",
        cfg.scheduler, cfg.quantum, cfg.core_count, cfg.model
    );
    println!("  Threads: {}", engine.threads().len());
    println!();
    engine
}

/// Steps the engine one tick at a time, printing what happened on each.
fn cmd_run_stepped(mut engine: Engine, ticks: u64, sections: &[String]) {
    let mut ran = 0;
    while ran < ticks && engine.has_runnable() {
        let report = engine.step();
        print_tick(&engine, &report);
        ran += 1;
    }
    finish(&engine, sections);
}

/// Lets the auto-runner drive ticks at the configured interval until the engine idles.
fn cmd_run_auto(engine: Engine, ticks: u64, sections: &[String]) {
    let interval = Duration::from_millis(engine.config().tick_interval_ms);
    let shared = SharedEngine::new(engine);
    shared.lock().start();

    let mut runner =
        AutoRunner::spawn(shared.clone(), interval).unwrap_or_else(|e| fail(e));
    loop {
        thread::sleep(interval);
        let mut engine = shared.lock();
        println!(
            "[tick {:>4}] ready={} running={}",
            engine.tick(),
            engine.scheduler().ready().len(),
            engine.cores().busy_count()
        );
        if !engine.has_runnable() || engine.tick() >= ticks {
            engine.pause();
            break;
        }
    }
    runner.stop();

    let engine = shared.lock();
    finish(&engine, sections);
}

fn print_tick(engine: &Engine, report: &TickReport) {
    let mut line = format!("[tick {:>4}]", report.tick);
    for d in &report.dispatched {
        line.push_str(&format!(" {}->core{}", name_of(engine, d.thread), d.kernel));
    }
    for id in &report.preempted {
        line.push_str(&format!(" preempt:{}", name_of(engine, *id)));
    }
    for id in &report.completed {
        line.push_str(&format!(" done:{}", name_of(engine, *id)));
    }
    println!("{line}");
}

fn name_of(engine: &Engine, id: threadsim_core::common::ThreadId) -> String {
    engine
        .threads()
        .get(id)
        .map_or_else(|| id.to_string(), |t| t.name().to_owned())
}

fn finish(engine: &Engine, sections: &[String]) {
    if engine.has_runnable() {
        println!("\n[*] Tick limit reached with work remaining");
    } else {
        println!("\n[*] All runnable threads finished at tick {}", engine.tick());
    }
    engine.stats().print_sections(engine.threads(), sections);
}

/// Applies each action in the file through `Engine::handle`.
///
/// Rejected actions are reported in their reply line and do not stop the script.
fn cmd_script(path: &Path) {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading {}: {e}", path.display())));
    let actions: Vec<Action> = serde_json::from_str(&text)
        .unwrap_or_else(|e| fail(format!("parsing {}: {e}", path.display())));

    let mut engine = Engine::default();
    for action in actions {
        let reply = engine.handle(action);
        match serde_json::to_string(&reply) {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        }
    }
}
