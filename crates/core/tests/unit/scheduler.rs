//! # Scheduling Policy Tests
//!
//! Dispatch order, preemption and switch accounting for FCFS, RR and PRIORITY.

use pretty_assertions::assert_eq;
use threadsim_core::common::KernelId;
use threadsim_core::config::{ConfigUpdate, SchedulerKind};
use threadsim_core::sim::WaitOutcome;
use threadsim_core::thread::ThreadState;

use crate::common::{TestContext, assert_consistent};

#[test]
fn test_fcfs_runs_to_completion_in_arrival_order() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Fcfs, 1, 1);
    let ids = ctx.spawn(&[("A", 3, 5), ("B", 2, 0), ("C", 1, 0)]);

    ctx.steps(2);
    assert_eq!(ctx.state(ids[0]), ThreadState::Running);
    assert_eq!(ctx.thread(ids[0]).remaining(), 1);

    let ran = ctx.engine.run_until_idle(100);
    assert_eq!(ran, 4);
    assert_eq!(ctx.finish_order(), ids);
    assert_eq!(ctx.engine.stats().preemptions, 0);
    assert_eq!(ctx.engine.stats().context_switches, 3);
}

#[test]
fn test_fcfs_second_thread_starts_after_first_finishes() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Fcfs, 1, 1);
    let ids = ctx.spawn(&[("A", 3, 0), ("B", 2, 0)]);
    let _ = ctx.engine.run_until_idle(100);

    assert_eq!(ctx.thread(ids[0]).start_tick(), Some(1));
    assert_eq!(ctx.thread(ids[0]).finish_tick(), Some(3));
    assert_eq!(ctx.thread(ids[1]).start_tick(), Some(4));
    assert_eq!(ctx.thread(ids[1]).finish_tick(), Some(5));
}

#[test]
fn test_rr_preempts_after_quantum() {
    let mut ctx = TestContext::scheduled(SchedulerKind::RoundRobin, 2, 1);
    let ids = ctx.spawn(&[("A", 3, 0), ("B", 2, 0)]);

    ctx.steps(2);
    assert_eq!(ctx.state(ids[0]), ThreadState::Ready);
    assert_eq!(ctx.ready(), vec![ids[1], ids[0]]);
    assert_eq!(ctx.engine.stats().preemptions, 1);

    let _ = ctx.engine.run_until_idle(100);
    assert_eq!(ctx.finish_order(), vec![ids[1], ids[0]]);
    assert_eq!(ctx.thread(ids[1]).finish_tick(), Some(4));
    assert_eq!(ctx.thread(ids[0]).finish_tick(), Some(5));
    assert_eq!(ctx.engine.stats().context_switches, 3);
}

#[test]
fn test_rr_thread_finishing_on_quantum_boundary_is_not_preempted() {
    let mut ctx = TestContext::scheduled(SchedulerKind::RoundRobin, 2, 1);
    let ids = ctx.spawn(&[("A", 2, 0), ("B", 1, 0)]);
    ctx.steps(2);
    assert_eq!(ctx.state(ids[0]), ThreadState::Terminated);
    assert_eq!(ctx.engine.stats().preemptions, 0);
}

#[test]
fn test_rr_sole_thread_redispatch_is_not_a_switch() {
    let mut ctx = TestContext::scheduled(SchedulerKind::RoundRobin, 1, 1);
    let ids = ctx.spawn(&[("A", 3, 0)]);
    let _ = ctx.engine.run_until_idle(10);
    assert_eq!(ctx.thread(ids[0]).finish_tick(), Some(3));
    assert_eq!(ctx.engine.stats().preemptions, 2);
    assert_eq!(ctx.engine.stats().context_switches, 1);
}

#[test]
fn test_priority_picks_lowest_value_ties_by_arrival() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Priority, 1, 1);
    let ids = ctx.spawn(&[("low", 2, 3), ("hi1", 2, 1), ("hi2", 2, 1)]);
    let _ = ctx.engine.run_until_idle(100);
    assert_eq!(ctx.finish_order(), vec![ids[1], ids[2], ids[0]]);
}

#[test]
fn test_priority_is_non_preemptive() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Priority, 1, 1);
    let ids = ctx.spawn(&[("slow", 4, 5)]);
    ctx.steps(1);
    let urgent = ctx.spawn(&[("urgent", 1, 0)]);

    ctx.steps(3);
    assert_eq!(ctx.state(ids[0]), ThreadState::Terminated);
    assert_eq!(ctx.state(urgent[0]), ThreadState::Ready);
    ctx.steps(1);
    assert_eq!(ctx.state(urgent[0]), ThreadState::Terminated);
}

#[test]
fn test_priority_tie_prefers_older_thread_after_wake() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Priority, 2, 1);
    let ids = ctx.spawn(&[("T1", 5, 1), ("T2", 5, 1)]);
    ctx.steps(1);
    assert_eq!(ctx.state(ids[0]), ThreadState::Running);

    ctx.engine.create_semaphore("s", 0).unwrap();
    assert_eq!(
        ctx.engine.semaphore_wait("s", ids[0]).unwrap(),
        WaitOutcome::Blocked
    );
    assert_eq!(ctx.engine.semaphore_signal("s").unwrap(), Some(ids[0]));
    // The woken thread sits behind the newer one in the queue.
    assert_eq!(ctx.ready(), vec![ids[1], ids[0]]);

    let report = ctx.engine.step();
    assert_eq!(report.dispatched.len(), 1);
    assert_eq!(report.dispatched[0].thread, ids[0]);
    assert_eq!(ctx.ready(), vec![ids[1]]);
    assert_consistent(&ctx.engine.snapshot());
}

#[test]
fn test_idle_cores_fill_in_ascending_order() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Fcfs, 1, 3);
    let ids = ctx.spawn(&[("A", 5, 0), ("B", 5, 0)]);
    let report = ctx.engine.step();

    assert_eq!(report.dispatched.len(), 2);
    assert_eq!(report.dispatched[0].thread, ids[0]);
    assert_eq!(report.dispatched[0].kernel.0, 0);
    assert_eq!(report.dispatched[1].thread, ids[1]);
    assert_eq!(report.dispatched[1].kernel.0, 1);
    assert!(ctx.engine.cores().get(KernelId(2)).unwrap().is_idle());
}

#[test]
fn test_switching_policy_keeps_queue_order() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Fcfs, 2, 1);
    let ids = ctx.spawn(&[("A", 1, 9), ("B", 1, 0), ("C", 1, 4)]);
    ctx.engine
        .set_config(ConfigUpdate {
            scheduler: Some(SchedulerKind::Priority),
            ..ConfigUpdate::default()
        })
        .unwrap();
    assert_eq!(ctx.ready(), ids);
    assert_eq!(ctx.engine.scheduler().kind(), SchedulerKind::Priority);

    let _ = ctx.engine.run_until_idle(10);
    assert_eq!(ctx.finish_order(), vec![ids[1], ids[2], ids[0]]);
}

#[test]
fn test_shrinking_cores_returns_threads_to_ready_tail() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Fcfs, 2, 3);
    let ids = ctx.spawn(&[("A", 5, 0), ("B", 5, 0), ("C", 5, 0), ("D", 5, 0)]);
    ctx.steps(1);
    assert_eq!(ctx.ready(), vec![ids[3]]);

    ctx.set_cores(1);
    assert_eq!(ctx.engine.cores().len(), 1);
    assert_eq!(ctx.state(ids[0]), ThreadState::Running);
    assert_eq!(ctx.ready(), vec![ids[3], ids[1], ids[2]]);
    assert_consistent(&ctx.engine.snapshot());

    ctx.set_cores(2);
    ctx.steps(1);
    assert_eq!(ctx.state(ids[3]), ThreadState::Running);
    assert_consistent(&ctx.engine.snapshot());
}

#[rstest::rstest]
#[case(1)]
#[case(2)]
fn test_rr_two_equal_threads_finish_within_eight_ticks(#[case] cores: usize) {
    let mut ctx = TestContext::scheduled(SchedulerKind::RoundRobin, 2, cores);
    let ids = ctx.spawn(&[("A", 4, 0), ("B", 4, 0)]);
    ctx.steps(8);

    assert!(ids.iter().all(|&id| ctx.state(id) == ThreadState::Terminated));
    assert_eq!(ctx.engine.stats().preemptions, 2);
    assert!(ctx.engine.stats().context_switches >= 2);
}

#[test]
fn test_priority_ignores_add_order() {
    let mut ctx = TestContext::scheduled(SchedulerKind::Priority, 2, 1);
    let ids = ctx.spawn(&[("lazy", 2, 5), ("eager", 2, 1)]);
    let report = ctx.engine.step();
    assert_eq!(report.dispatched[0].thread, ids[1]);
    assert_eq!(ctx.state(ids[0]), ThreadState::Ready);
}
