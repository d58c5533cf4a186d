//! Definition source aggregation

use diplug_domain::value_objects::DefinitionSource;
use tracing::debug;

/// Ordered definition sources for one build
///
/// The base source always comes first and the parameters source always
/// last, so parameters override everything else. The environment overlay
/// sits in between, and only when its file exists right now; a missing
/// overlay is not an error.
pub fn collect(
    base: &DefinitionSource,
    overlay: Option<&DefinitionSource>,
    parameters: &DefinitionSource,
) -> Vec<DefinitionSource> {
    let mut sources = Vec::with_capacity(3);
    sources.push(base.clone());

    match overlay {
        Some(overlay) if overlay.path().is_file() => {
            debug!(path = %overlay.path().display(), "Environment overlay found");
            sources.push(overlay.clone());
        }
        Some(overlay) => {
            debug!(path = %overlay.path().display(), "No environment overlay");
        }
        None => {}
    }

    sources.push(parameters.clone());
    sources
}
