//! Definition file parsing tests

use diplug_infrastructure::di::definitions::{Definition, FactoryDefinition, parse_definitions};
use serde_json::json;
use std::path::Path;

fn parse(content: &str) -> diplug_domain::Result<diplug_infrastructure::di::DefinitionMap> {
    parse_definitions(Path::new("/defs/container.toml"), content)
}

#[test]
fn test_parse_every_entry_form() {
    let definitions = parse(
        r#"
        answer = 42
        "db.host" = "localhost"
        ports = [80, 443]
        alias = { get = "answer" }
        greeting = { string = "Hello {user.name}" }
        home = { env = "HOME", default = "/tmp" }
        token = { env = "TOKEN" }
        mailer = { factory = "smtp", args = { host = { get = "db.host" }, port = 25 }, lazy = true }
        plain = { factory = "clock" }
        "#,
    )
    .unwrap();

    assert_eq!(definitions["answer"], Definition::value(42));
    assert_eq!(definitions["db.host"], Definition::value("localhost"));
    assert_eq!(definitions["ports"], Definition::value(json!([80, 443])));
    assert_eq!(definitions["alias"], Definition::reference("answer"));
    assert_eq!(definitions["greeting"], Definition::string("Hello {user.name}"));
    assert_eq!(definitions["home"], Definition::env("HOME", Some(json!("/tmp"))));
    assert_eq!(definitions["token"], Definition::env("TOKEN", None));
    assert_eq!(
        definitions["mailer"],
        Definition::from(
            FactoryDefinition::new("smtp")
                .arg("host", Definition::reference("db.host"))
                .arg("port", Definition::value(25))
                .lazy(true)
        )
    );
    assert!(definitions["mailer"].is_lazy());
    assert!(!definitions["plain"].is_lazy());
}

#[test]
fn test_tables_without_marker_keys_are_literals() {
    let definitions = parse(
        r#"
        [database]
        host = "db"
        port = 5432
        "#,
    )
    .unwrap();

    assert_eq!(
        definitions["database"],
        Definition::value(json!({"host": "db", "port": 5432}))
    );
}

#[test]
fn test_empty_file_has_no_entries() {
    assert!(parse("# nothing here\n").unwrap().is_empty());
}

#[test]
fn test_invalid_toml_names_the_file() {
    let err = parse("answer = ").unwrap_err();
    let message = err.to_string();

    assert!(message.contains("/defs/container.toml"), "{message}");
    assert!(message.contains("invalid TOML"), "{message}");
}

#[test]
fn test_marker_with_extra_keys_is_rejected() {
    let err = parse(r#"alias = { get = "answer", other = 1 }"#).unwrap_err();
    assert!(err.to_string().contains("unexpected key 'other'"));
}

#[test]
fn test_marker_with_wrong_type_is_rejected() {
    let err = parse("alias = { get = 5 }").unwrap_err();
    assert!(err.to_string().contains("'get' must be a non-empty string"));

    let err = parse(r#"svc = { factory = "f", lazy = "yes" }"#).unwrap_err();
    assert!(err.to_string().contains("'lazy' must be a boolean"));

    let err = parse(r#"svc = { factory = "f", args = 3 }"#).unwrap_err();
    assert!(err.to_string().contains("'args' must be a table"));
}

#[test]
fn test_factory_arguments_cannot_declare_services() {
    let err = parse(r#"svc = { factory = "f", args = { inner = { factory = "g" } } }"#).unwrap_err();
    assert!(err.to_string().contains("argument 'inner'"));
}

#[test]
fn test_definitions_survive_json_round_trip() {
    // The definition cache stores parsed files as JSON
    let definitions = parse(
        r#"
        a = { env = "A", default = 1 }
        b = { factory = "f", args = { x = { string = "{a}" } } }
        "#,
    )
    .unwrap();

    let json = serde_json::to_string(&definitions).unwrap();
    let restored: diplug_infrastructure::di::DefinitionMap = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, definitions);
}
