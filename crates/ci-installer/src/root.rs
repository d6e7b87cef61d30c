//! Project-root discovery

use std::path::Path;

use ci_fs::NormalizedPath;
use serde_json::Value;
use tracing::{debug, warn};

use crate::manifest::COMPOSER_FILE;

/// Directories checked, `start` included.
pub const MAX_ASCENT: usize = 10;

/// Walk up from `start` to the first directory whose `composer.json` is
/// not `own_package`'s. Falls back to `start`.
///
/// A manifest that fails to parse, or has no `name`, counts as the project.
pub fn find_project_root(start: &Path, own_package: &str) -> NormalizedPath {
    for dir in start.ancestors().take(MAX_ASCENT) {
        let manifest = dir.join(COMPOSER_FILE);
        debug!(path = %manifest.display(), "looking for project manifest");
        if !manifest.is_file() {
            continue;
        }
        if package_name(&manifest).as_deref() != Some(own_package) {
            debug!(root = %dir.display(), "found project root");
            return NormalizedPath::new(dir);
        }
    }

    warn!(start = %start.display(), "could not determine project root; using start directory");
    NormalizedPath::new(start)
}

fn package_name(manifest: &Path) -> Option<String> {
    let content = std::fs::read_to_string(manifest).ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    value.get("name")?.as_str().map(str::to_string)
}
