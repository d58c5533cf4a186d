//! Definition aggregator tests

use diplug_domain::value_objects::{DefinitionRole, DefinitionSource};
use diplug_infrastructure::di::aggregator::collect;
use tempfile::TempDir;

struct Sources {
    _dir: TempDir,
    base: DefinitionSource,
    overlay: DefinitionSource,
    parameters: DefinitionSource,
}

fn sources() -> Sources {
    let dir = TempDir::new().unwrap();
    let base = DefinitionSource::new(DefinitionRole::Container, None, dir.path().join("container.toml"));
    let overlay = DefinitionSource::new(
        DefinitionRole::Container,
        Some("dev"),
        dir.path().join("dev.container.toml"),
    );
    let parameters =
        DefinitionSource::new(DefinitionRole::Parameters, None, dir.path().join("parameters.toml"));
    Sources {
        _dir: dir,
        base,
        overlay,
        parameters,
    }
}

#[test]
fn test_missing_overlay_is_skipped() {
    let s = sources();
    let collected = collect(&s.base, Some(&s.overlay), &s.parameters);

    assert_eq!(collected, vec![s.base.clone(), s.parameters.clone()]);
}

#[test]
fn test_overlay_inclusion_follows_the_file() {
    let s = sources();

    std::fs::write(s.overlay.path(), "").unwrap();
    let with_overlay = collect(&s.base, Some(&s.overlay), &s.parameters);
    assert_eq!(
        with_overlay,
        vec![s.base.clone(), s.overlay.clone(), s.parameters.clone()]
    );

    std::fs::remove_file(s.overlay.path()).unwrap();
    let without_overlay = collect(&s.base, Some(&s.overlay), &s.parameters);
    assert_eq!(without_overlay, vec![s.base.clone(), s.parameters.clone()]);
}

#[test]
fn test_overlay_directory_is_not_a_file() {
    let s = sources();
    std::fs::create_dir(s.overlay.path()).unwrap();

    assert_eq!(collect(&s.base, Some(&s.overlay), &s.parameters).len(), 2);
}

#[test]
fn test_parameters_always_last_and_base_first() {
    let s = sources();
    std::fs::write(s.overlay.path(), "").unwrap();

    for overlay in [None, Some(&s.overlay)] {
        let collected = collect(&s.base, overlay, &s.parameters);
        assert_eq!(collected.first(), Some(&s.base));
        assert_eq!(collected.last(), Some(&s.parameters));
    }
}

#[test]
fn test_base_and_parameters_included_even_when_missing() {
    let s = sources();
    let collected = collect(&s.base, None, &s.parameters);

    assert_eq!(collected.len(), 2);
    assert!(!collected[0].path().exists());
    assert!(!collected[1].path().exists());
}
