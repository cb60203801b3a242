//! # Semaphore Tests
//!
//! P/V semantics, FIFO hand-off and rejection of bad calls.

use pretty_assertions::assert_eq;
use threadsim_core::SimError;
use threadsim_core::common::{Entity, ThreadId};
use threadsim_core::sim::WaitOutcome;
use threadsim_core::thread::ThreadState;

use crate::common::{TestContext, assert_consistent};

/// Two long threads running on the two default cores, plus semaphore `s`.
fn running_pair(initial: i64) -> (TestContext, ThreadId, ThreadId) {
    let mut ctx = TestContext::new();
    let ids = ctx.spawn(&[("A", 10, 0), ("B", 10, 0)]);
    ctx.steps(1);
    ctx.engine.create_semaphore("s", initial).unwrap();
    (ctx, ids[0], ids[1])
}

#[test]
fn test_wait_with_permit_acquires() {
    let (mut ctx, a, _) = running_pair(1);
    assert_eq!(ctx.engine.semaphore_wait("s", a).unwrap(), WaitOutcome::Acquired);
    assert_eq!(ctx.engine.sync().semaphore("s").unwrap().value(), 0);
    assert_eq!(ctx.state(a), ThreadState::Running);
}

#[test]
fn test_wait_without_permit_blocks_and_frees_core() {
    let (mut ctx, a, b) = running_pair(1);
    let _ = ctx.engine.semaphore_wait("s", a).unwrap();
    assert_eq!(ctx.engine.semaphore_wait("s", b).unwrap(), WaitOutcome::Blocked);

    let sem = ctx.engine.sync().semaphore("s").unwrap();
    assert_eq!(sem.value(), 0);
    assert_eq!(sem.blocked().collect::<Vec<_>>(), vec![b]);
    assert_eq!(sem.blocked_len(), 1);
    assert_eq!(ctx.state(b), ThreadState::Blocked);
    assert_eq!(ctx.thread(b).mapped_kernel(), None);
    assert_eq!(ctx.engine.cores().busy_count(), 1);
    assert_consistent(&ctx.engine.snapshot());
}

#[test]
fn test_signal_hands_off_before_incrementing() {
    let (mut ctx, a, b) = running_pair(0);
    let _ = ctx.engine.semaphore_wait("s", a).unwrap();
    let _ = ctx.engine.semaphore_wait("s", b).unwrap();

    assert_eq!(ctx.engine.semaphore_signal("s").unwrap(), Some(a));
    assert_eq!(ctx.state(a), ThreadState::Ready);
    assert_eq!(ctx.ready(), vec![a]);
    assert_eq!(ctx.engine.sync().semaphore("s").unwrap().value(), 0);

    assert_eq!(ctx.engine.semaphore_signal("s").unwrap(), Some(b));
    assert_eq!(ctx.engine.semaphore_signal("s").unwrap(), None);
    assert_eq!(ctx.engine.sync().semaphore("s").unwrap().value(), 1);
    assert_eq!(ctx.ready(), vec![a, b]);
}

#[test]
fn test_woken_thread_is_dispatched_again() {
    let (mut ctx, a, _) = running_pair(0);
    let _ = ctx.engine.semaphore_wait("s", a).unwrap();
    let _ = ctx.engine.semaphore_signal("s").unwrap();
    ctx.steps(1);
    assert_eq!(ctx.state(a), ThreadState::Running);
    assert_eq!(ctx.thread(a).remaining(), 8);
}

#[test]
fn test_wait_requires_running_thread() {
    let (mut ctx, _, _) = running_pair(1);
    let waiting = ctx.spawn(&[("C", 3, 0)]);
    let before = ctx.engine.snapshot();

    let err = ctx.engine.semaphore_wait("s", waiting[0]).unwrap_err();
    assert_eq!(
        err,
        SimError::InvalidStateTransition {
            thread: waiting[0],
            op: "wait",
            actual: ThreadState::Ready,
            expected: ThreadState::Running,
        }
    );
    assert_eq!(ctx.engine.snapshot(), before);
}

#[test]
fn test_unknown_names_and_threads() {
    let (mut ctx, a, _) = running_pair(1);
    assert!(matches!(
        ctx.engine.semaphore_wait("nope", a),
        Err(SimError::NotFound { entity: Entity::Semaphore, .. })
    ));
    assert!(matches!(
        ctx.engine.semaphore_wait("s", ThreadId(99)),
        Err(SimError::NotFound { entity: Entity::Thread, .. })
    ));
    assert!(matches!(
        ctx.engine.semaphore_signal("nope"),
        Err(SimError::NotFound { entity: Entity::Semaphore, .. })
    ));
}

#[test]
fn test_create_rejects_duplicates_and_negatives() {
    let (mut ctx, _, _) = running_pair(1);
    assert!(matches!(
        ctx.engine.create_semaphore("s", 5),
        Err(SimError::DuplicateName { entity: Entity::Semaphore, .. })
    ));
    assert!(matches!(
        ctx.engine.create_semaphore("t", -1),
        Err(SimError::InvalidValue(_))
    ));
    assert_eq!(ctx.engine.sync().semaphore("s").unwrap().value(), 1);
    assert!(ctx.engine.sync().semaphore("t").is_err());
}
