//! Error Tests

use diplug_domain::error::{Error, Result};
use std::error::Error as _;

#[test]
fn test_circular_dependency_display() {
    let err = Error::CircularDependency {
        path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    };
    assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
}

#[test]
fn test_io_conversion() {
    fn read() -> Result<String> {
        Ok(std::fs::read_to_string("/definitely/not/here.toml")?)
    }

    let err = read().unwrap_err();
    assert!(matches!(err, Error::IoSimple { .. }));
}

#[test]
fn test_definition_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = Error::definition_with_source("/tmp/container.toml", "cannot read", io);

    assert!(err.to_string().contains("/tmp/container.toml"));
    assert!(err.source().is_some());
}

#[test]
fn test_helper_constructors() {
    assert!(matches!(Error::not_found("svc"), Error::NotFound { id } if id == "svc"));
    assert!(matches!(
        Error::listener("audit", "boom"),
        Error::Listener { listener, .. } if listener == "audit"
    ));
    assert!(matches!(
        Error::installation("nope"),
        Error::Installation { source: None, .. }
    ));
}
