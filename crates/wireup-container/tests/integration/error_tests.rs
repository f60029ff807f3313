//! Failed container runs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wireup_container::{Container, Many};
use wireup_domain::{Error, ErrorKind, TypeKey};

use crate::fixtures::{Command, Handler};

#[test]
#[allow(clippy::cast_possible_truncation)]
fn test_cycle_reports_key_path() {
    let err = Container::new()
        .provide(|x: i32| f64::from(x))
        .provide(|x: f64| (x as i32, String::from("hi")))
        .run(|_: String| {})
        .unwrap_err();
    match &err {
        Error::CyclicDependency { path } => assert_eq!(
            path,
            &vec![
                TypeKey::of::<i32>(),
                TypeKey::of::<f64>(),
                TypeKey::of::<i32>()
            ]
        ),
        other => panic!("Expected CyclicDependency error, got {other}"),
    }
    assert_eq!(err.to_string(), "cyclic dependency: i32 → f64 → i32");
}

#[test]
#[allow(clippy::cast_possible_truncation)]
fn test_missing_entry_input_is_unresolved() {
    let err = Container::new()
        .provide(|| 1.5_f64)
        .provide(|x: f64| x as i32)
        .run(|_: String| {})
        .unwrap_err();
    match err {
        Error::UnresolvedDependency { key, .. } => assert_eq!(key, TypeKey::of::<String>()),
        other => panic!("Expected UnresolvedDependency error, got {other}"),
    }
}

#[test]
#[allow(clippy::cast_possible_truncation)]
fn test_missing_input_of_any_constructor_is_unresolved() {
    let err = Container::new()
        .provide(|x: f64| format!("{x}"))
        .provide(|x: i32| f64::from(x))
        .provide(|x: f32| x as i32)
        .run(|_: String| {})
        .unwrap_err();
    match err {
        Error::UnresolvedDependency { key, .. } => assert_eq!(key, TypeKey::of::<f32>()),
        other => panic!("Expected UnresolvedDependency error, got {other}"),
    }
}

#[test]
fn test_forced_error_fails_with_caller_error() {
    let err = Container::new()
        .error(std::io::Error::other("an error"))
        .run(|| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ForcedError);
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "an error");
}

#[derive(Debug)]
struct ConfigRejected {
    field: &'static str,
}

impl std::fmt::Display for ConfigRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rejected field {}", self.field)
    }
}

impl std::error::Error for ConfigRejected {}

#[test]
fn test_forced_error_keeps_caller_error_in_chain() {
    let container = Container::new().error(ConfigRejected { field: "port" });

    for _ in 0..2 {
        let err = container.run(|| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ForcedError);

        let mut found = None;
        let mut current = std::error::Error::source(&err);
        while let Some(cause) = current {
            if let Some(rejected) = cause.downcast_ref::<ConfigRejected>() {
                found = Some(rejected.field);
                break;
            }
            current = cause.source();
        }
        assert_eq!(found, Some("port"));
    }
}

#[test]
fn test_forced_error_precedes_graph_errors() {
    let err = Container::new()
        .provide(|| 1_u8)
        .provide(|| 2_u8)
        .error("stop")
        .run(|_: String| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ForcedError);
}

#[test]
fn test_duplicate_unique_provider() {
    let err = Container::new()
        .provide(|| 1_u8)
        .provide(|| 2_u8)
        .run(|_: u8| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateProvider);
}

#[test]
fn test_ambiguous_binding_lists_every_candidate() {
    let err = Container::new()
        .provide_in_scope("a", || 1_u8)
        .provide_in_scope("b", || 2_u8)
        .run(|_: u8| {})
        .unwrap_err();
    match err {
        Error::AmbiguousBinding { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("Expected AmbiguousBinding error, got {other}"),
    }
}

#[test]
fn test_unscoped_provider_wins_for_unscoped_entry() {
    let seen = Arc::new(std::sync::Mutex::new(None));
    let sink = Arc::clone(&seen);
    Container::new()
        .provide(|| 1_u8)
        .provide_in_scope("a", || 2_u8)
        .run(move |value: u8| *sink.lock().unwrap() = Some(value))
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(1));
}

#[test]
fn test_one_per_scope_rejects_second_provider_in_scope() {
    let err = Container::new()
        .one_per_scope::<Handler>()
        .provide_in_scope("a", || Handler { module: "a" })
        .provide_in_scope("a", || Handler { module: "again" })
        .run(|| {})
        .unwrap_err();
    match err {
        Error::DuplicateProvider { key, .. } => assert_eq!(key.to_string(), "Handler@a"),
        other => panic!("Expected DuplicateProvider error, got {other}"),
    }
}

#[test]
fn test_one_per_scope_requires_a_scope() {
    let err = Container::new()
        .one_per_scope::<Handler>()
        .provide(Handler::default)
        .run(|| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ScopeRequired);
}

#[test]
fn test_sequence_of_unique_type_is_policy_mismatch() {
    let err = Container::new()
        .provide(|| Command { name: "only" })
        .run(|_: Many<Command>| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyMismatch);
}

#[test]
fn test_single_value_of_grouped_type_is_policy_mismatch() {
    let err = Container::new()
        .auto_group::<Command>()
        .provide(|| Command { name: "only" })
        .run(|_: Command| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyMismatch);
}

#[test]
fn test_conflicting_policies_are_policy_mismatch() {
    let err = Container::new()
        .auto_group::<Command>()
        .one_per_scope::<Command>()
        .run(|| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyMismatch);
}

#[test]
fn test_constructor_failure_aborts_run() {
    let entered = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&entered);
    let err = Container::new()
        .provide(|| -> anyhow::Result<u8> { anyhow::bail!("no value") })
        .run(move |_: u8| flag.store(true, Ordering::SeqCst))
        .unwrap_err();
    match &err {
        Error::ConstructorFailure { source, .. } => assert_eq!(source.to_string(), "no value"),
        other => panic!("Expected ConstructorFailure error, got {other}"),
    }
    assert!(!entered.load(Ordering::SeqCst));
}

#[test]
fn test_entry_error_is_run_result() {
    let err = Container::new()
        .run(|| -> anyhow::Result<()> { anyhow::bail!("entry failed") })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstructorFailure);
    assert!(err.to_string().contains("entry failed"));
}
