//! # Property Tests
//!
//! Random action sequences must keep the engine structurally consistent, and rejected
//! actions must leave it exactly as it was.

use proptest::prelude::*;
use threadsim_core::Engine;
use threadsim_core::common::ThreadId;
use threadsim_core::sim::Action;

use crate::common::assert_consistent;

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", ""]).prop_map(str::to_owned)
}

fn thread_id() -> impl Strategy<Value = ThreadId> {
    (0u64..8).prop_map(ThreadId)
}

fn cond() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["default", "other"]).prop_map(str::to_owned))
}

fn lifecycle() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Step),
        Just(Action::Step),
        Just(Action::Start),
        Just(Action::Pause),
        Just(Action::GetState),
        Just(Action::Reset),
        Just(Action::InitDemo),
    ]
}

fn threads_and_config() -> impl Strategy<Value = Action> {
    prop_oneof![
        (prop::option::of("[A-Z]{1,3}"), -2i64..6, -2i32..4).prop_map(|(name, burst, priority)| {
            Action::AddThread {
                name,
                burst,
                priority,
            }
        }),
        (
            prop::option::of(prop::sample::select(vec!["RR", "FCFS", "PRIORITY", "SJF"])),
            prop::option::of(-1i64..4),
            prop::option::of(-1i64..4),
        )
            .prop_map(|(scheduler, quantum, core_count)| Action::SetConfig {
                model: None,
                scheduler: scheduler.map(str::to_owned),
                quantum,
                core_count,
            }),
    ]
}

fn sync_ops() -> impl Strategy<Value = Action> {
    prop_oneof![
        (name(), -1i64..3).prop_map(|(name, initial)| Action::SemaphoreCreate { name, initial }),
        (name(), thread_id()).prop_map(|(name, thread_id)| Action::SemaphoreWait { name, thread_id }),
        name().prop_map(|name| Action::SemaphoreSignal { name }),
        name().prop_map(|name| Action::MonitorCreate { name }),
        (name(), thread_id(), cond()).prop_map(|(name, thread_id, cond)| Action::MonitorWait {
            name,
            thread_id,
            cond
        }),
        (name(), cond()).prop_map(|(name, cond)| Action::MonitorSignal { name, cond }),
        (name(), cond()).prop_map(|(name, cond)| Action::MonitorBroadcast { name, cond }),
    ]
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => lifecycle(),
        3 => threads_and_config(),
        4 => sync_ops(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_invariants_hold(actions in prop::collection::vec(any_action(), 1..80)) {
        let mut engine = Engine::default();
        for action in actions {
            let before = engine.snapshot();
            let reply = engine.handle(action);
            if !reply.ok {
                prop_assert_eq!(&reply.state, &before);
            }
            assert_consistent(&reply.state);
            prop_assert!(reply.state.tick >= before.tick || reply.state.tick == 0);
        }
    }

    #[test]
    fn prop_every_unit_of_work_is_one_busy_core_tick(
        bursts in prop::collection::vec(1i64..8, 1..6),
        cores in 1i64..4,
        quantum in 1i64..4,
    ) {
        let mut engine = Engine::default();
        let update = threadsim_core::config::ConfigUpdate {
            core_count: Some(cores),
            quantum: Some(quantum),
            ..Default::default()
        };
        engine.set_config(update).unwrap();
        for &b in &bursts {
            let _ = engine.add_thread(None, b, 0).unwrap();
        }
        let _ = engine.run_until_idle(1_000);

        prop_assert!(engine.threads().all_terminated());
        let total: i64 = bursts.iter().sum();
        prop_assert_eq!(engine.stats().busy_core_ticks, total as u64);
        prop_assert!(engine.stats().context_switches >= bursts.len() as u64);
    }
}
