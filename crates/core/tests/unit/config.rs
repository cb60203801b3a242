//! # Configuration Tests
//!
//! Defaults, JSON loading, validation and runtime updates.

use std::io::Write;

use rstest::rstest;
use tempfile::NamedTempFile;
use threadsim_core::SimError;
use threadsim_core::config::*;

use crate::common::TestContext;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.scheduler, SchedulerKind::RoundRobin);
    assert_eq!(config.model, MappingModel::ManyToMany);
    assert_eq!(config.quantum, 2);
    assert_eq!(config.core_count, 2);
    assert_eq!(config.tick_interval_ms, 200);
}

#[test]
fn test_missing_fields_take_defaults() {
    let config = Config::from_json(r#"{"scheduler": "PRIORITY", "quantum": 4}"#).unwrap();
    assert_eq!(config.scheduler, SchedulerKind::Priority);
    assert_eq!(config.quantum, 4);
    assert_eq!(config.core_count, 2);
    assert_eq!(config.model, MappingModel::ManyToMany);
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"model": "ONE_TO_ONE", "scheduler": "fcfs", "core_count": 4, "tick_interval_ms": 50}}"#
    )
    .unwrap();

    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(config.model, MappingModel::OneToOne);
    assert_eq!(config.scheduler, SchedulerKind::Fcfs);
    assert_eq!(config.core_count, 4);
    assert_eq!(config.tick_interval_ms, 50);
}

#[test]
fn test_missing_file_is_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_path(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));
}

#[rstest]
#[case(r#"{"quantum": 0}"#, "InvalidQuantum")]
#[case(r#"{"core_count": 0}"#, "InvalidValue")]
#[case(r#"{"tick_interval_ms": 0}"#, "InvalidValue")]
#[case(r#"{"tick_interval_ms": 86400001}"#, "InvalidValue")]
#[case(r#"{"tick_interval_ms": 18446744073709551615}"#, "InvalidValue")]
#[case(r#"{"scheduler": "LOTTERY"}"#, "InvalidConfig")]
#[case(r#"{"model": "weird"}"#, "InvalidConfig")]
#[case("not json", "InvalidConfig")]
fn test_rejected_documents(#[case] json: &str, #[case] kind: &str) {
    let err = Config::from_json(json).unwrap_err();
    assert_eq!(format!("{:?}", err.kind()), kind);
}

#[rstest]
#[case("RR", SchedulerKind::RoundRobin)]
#[case("rr", SchedulerKind::RoundRobin)]
#[case("RoundRobin", SchedulerKind::RoundRobin)]
#[case("round_robin", SchedulerKind::RoundRobin)]
#[case("FCFS", SchedulerKind::Fcfs)]
#[case("fifo", SchedulerKind::Fcfs)]
#[case("Priority", SchedulerKind::Priority)]
#[case(" pr ", SchedulerKind::Priority)]
fn test_scheduler_names(#[case] name: &str, #[case] expected: SchedulerKind) {
    assert_eq!(name.parse::<SchedulerKind>().unwrap(), expected);
}

#[rstest]
#[case("many_to_one", MappingModel::ManyToOne)]
#[case("ONE-TO-ONE", MappingModel::OneToOne)]
#[case("Many_To_Many", MappingModel::ManyToMany)]
fn test_model_names(#[case] name: &str, #[case] expected: MappingModel) {
    assert_eq!(name.parse::<MappingModel>().unwrap(), expected);
}

#[rstest]
#[case(r#"{"scheduler": "Fcfs"}"#, SchedulerKind::Fcfs, MappingModel::ManyToMany)]
#[case(r#"{"scheduler": "round_robin"}"#, SchedulerKind::RoundRobin, MappingModel::ManyToMany)]
#[case(r#"{"scheduler": "pr"}"#, SchedulerKind::Priority, MappingModel::ManyToMany)]
#[case(r#"{"model": "many_to_one"}"#, SchedulerKind::RoundRobin, MappingModel::ManyToOne)]
#[case(r#"{"model": "one-to-one"}"#, SchedulerKind::RoundRobin, MappingModel::OneToOne)]
fn test_json_accepts_runtime_spellings(
    #[case] json: &str,
    #[case] scheduler: SchedulerKind,
    #[case] model: MappingModel,
) {
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.scheduler, scheduler);
    assert_eq!(config.model, model);
}

#[test]
fn test_json_writes_canonical_names() {
    let config = Config::from_json(r#"{"scheduler": "fifo", "model": "many-to-one"}"#).unwrap();
    let json = serde_json::to_value(config).unwrap();
    assert_eq!(json["scheduler"], "FCFS");
    assert_eq!(json["model"], "MANY_TO_ONE");
}

#[test]
fn test_longest_tick_interval_is_accepted() {
    let config = Config::from_json(r#"{"tick_interval_ms": 86400000}"#).unwrap();
    assert_eq!(config.tick_interval_ms, 86_400_000);
}

#[test]
fn test_unknown_names_are_invalid_value() {
    assert!(matches!("SJF".parse::<SchedulerKind>(), Err(SimError::InvalidValue(_))));
    assert!(matches!("hybrid".parse::<MappingModel>(), Err(SimError::InvalidValue(_))));
    assert!(matches!(
        ConfigUpdate::from_names(None, Some("bogus"), None, None),
        Err(SimError::InvalidValue(_))
    ));
}

#[test]
fn test_set_config_quantum_must_be_positive() {
    let mut ctx = TestContext::new();
    for q in [0, -3] {
        let err = ctx
            .engine
            .set_config(ConfigUpdate {
                quantum: Some(q),
                ..ConfigUpdate::default()
            })
            .unwrap_err();
        assert_eq!(err, SimError::InvalidQuantum(q));
    }
    assert_eq!(ctx.engine.config().quantum, 2);
}

#[test]
fn test_set_config_rejects_zero_cores() {
    let mut ctx = TestContext::new();
    let err = ctx
        .engine
        .set_config(ConfigUpdate {
            core_count: Some(0),
            ..ConfigUpdate::default()
        })
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidValue(_)));
    assert_eq!(ctx.engine.cores().len(), 2);
}

#[test]
fn test_set_config_is_all_or_nothing() {
    let mut ctx = TestContext::new();
    let before = ctx.engine.snapshot();
    let update = ConfigUpdate {
        scheduler: Some(SchedulerKind::Priority),
        model: Some(MappingModel::OneToOne),
        core_count: Some(4),
        quantum: Some(0),
    };
    assert!(ctx.engine.set_config(update).is_err());
    pretty_assertions::assert_eq!(ctx.engine.snapshot(), before);
}

#[test]
fn test_model_is_a_label_only() {
    let mut ctx = TestContext::new();
    let ids = ctx.spawn(&[("A", 3, 0), ("B", 3, 0)]);
    ctx.engine
        .set_config(ConfigUpdate {
            model: Some(MappingModel::ManyToOne),
            ..ConfigUpdate::default()
        })
        .unwrap();
    ctx.steps(1);
    assert_eq!(ctx.engine.snapshot().model, MappingModel::ManyToOne);
    assert_eq!(ctx.engine.cores().busy_count(), 2);
    assert!(ids.iter().all(|&id| ctx.thread(id).mapped_kernel().is_some()));
}
