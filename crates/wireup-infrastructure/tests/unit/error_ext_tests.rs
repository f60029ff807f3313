//! Error Context Tests

use std::io;

use wireup_domain::{Error, ErrorKind};
use wireup_infrastructure::ErrorContext;

fn failing() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
}

#[test]
fn test_io_context_keeps_source() {
    let err = failing().io_context("Failed to read wireup.toml").unwrap_err();
    match &err {
        Error::Io { message, source } => {
            assert_eq!(message, "Failed to read wireup.toml: missing");
            assert!(source.is_some());
        }
        other => panic!("Expected Io error, got {other}"),
    }
}

#[test]
fn test_config_context() {
    let err = failing().config_context("Bad config").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_lazy_context() {
    let err = failing()
        .with_context(|| format!("attempt {}", 3))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("attempt 3: missing"));
}
