//! Environment tests

use diplug_domain::Environment;
use diplug_domain::constants::{ENVIRONMENT_FALLBACK_VAR, ENVIRONMENT_VAR};
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_primary_variable_wins() {
    let env = Environment::from_lookup(lookup(&[
        (ENVIRONMENT_VAR, "production"),
        (ENVIRONMENT_FALLBACK_VAR, "staging"),
    ]));
    assert_eq!(env.tag(), Some("production"));
    assert!(env.is_production());
}

#[test]
fn test_fallback_variable() {
    let env = Environment::from_lookup(lookup(&[(ENVIRONMENT_FALLBACK_VAR, "staging")]));
    assert_eq!(env.tag(), Some("staging"));
    assert!(!env.is_production());
}

#[test]
fn test_empty_primary_uses_fallback() {
    let env = Environment::from_lookup(lookup(&[
        (ENVIRONMENT_VAR, ""),
        (ENVIRONMENT_FALLBACK_VAR, "production"),
    ]));
    assert!(env.is_production());
}

#[test]
fn test_no_variables() {
    let env = Environment::from_lookup(lookup(&[]));
    assert_eq!(env, Environment::untagged());
    assert_eq!(env.to_string(), "<none>");
}

#[test]
fn test_empty_tag_is_untagged() {
    assert_eq!(Environment::tagged(""), Environment::untagged());
}

#[test]
#[serial_test::serial]
fn test_from_process_env() {
    // SAFETY: serialized with every other test touching these variables
    unsafe {
        std::env::set_var(ENVIRONMENT_VAR, "dev");
        std::env::remove_var(ENVIRONMENT_FALLBACK_VAR);
    }

    assert_eq!(Environment::from_env().tag(), Some("dev"));

    unsafe {
        std::env::remove_var(ENVIRONMENT_VAR);
    }
}
