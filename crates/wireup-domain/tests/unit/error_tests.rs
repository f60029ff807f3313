//! Unit tests for domain error types

use wireup_domain::{Error, ErrorKind, Location, TypeKey};

#[test]
fn test_cyclic_dependency_display() {
    let error = Error::CyclicDependency {
        path: vec![
            TypeKey::of::<i32>(),
            TypeKey::of::<f64>(),
            TypeKey::of::<i32>(),
        ],
    };
    assert_eq!(error.to_string(), "cyclic dependency: i32 → f64 → i32");
    assert_eq!(error.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn test_unresolved_dependency_names_key_and_consumer() {
    let error = Error::UnresolvedDependency {
        key: TypeKey::of::<f32>(),
        consumer: Location::new("provide_i32"),
    };
    assert_eq!(
        error.to_string(),
        "unresolved dependency f32 required by provide_i32"
    );
}

#[test]
fn test_ambiguous_binding_lists_candidates() {
    let error = Error::AmbiguousBinding {
        key: TypeKey::of::<String>(),
        consumer: Location::new("entry"),
        candidates: vec![Location::new("a"), Location::new("b")],
    };
    assert_eq!(
        error.to_string(),
        "ambiguous binding for String required by entry: candidates a, b"
    );
}

#[test]
fn test_constructor_failure_keeps_source() {
    let error = Error::constructor_failure(Location::new("provide"), "boom");
    match &error {
        Error::ConstructorFailure { location, source } => {
            assert_eq!(location.name(), "provide");
            assert_eq!(source.to_string(), "boom");
        }
        _ => panic!("Expected ConstructorFailure error"),
    }
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_forced_error() {
    let error = Error::forced("stop");
    assert_eq!(error.kind(), ErrorKind::ForcedError);
    assert_eq!(error.to_string(), "run aborted: stop");
}

#[test]
fn test_configuration_error() {
    let error = Error::configuration("bad level");
    match error {
        Error::Configuration { message, source } => {
            assert_eq!(message, "bad level");
            assert!(source.is_none());
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_io_error_with_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error = Error::io_with_source("read wireup.toml", io);
    assert_eq!(error.kind(), ErrorKind::Io);
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_policy_mismatch_error() {
    let error = Error::policy_mismatch(
        TypeKey::of::<u8>(),
        Location::new("consumer"),
        "a sequence was requested but u8 is unique",
    );
    assert_eq!(error.kind(), ErrorKind::PolicyMismatch);
    assert!(error.to_string().contains("u8 is unique"));
}
