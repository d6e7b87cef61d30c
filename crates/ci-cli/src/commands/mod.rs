//! Command implementations

mod install;
mod merge;
mod uninstall;
mod version;

use std::path::{Path, PathBuf};

use ci_fs::NormalizedPath;
use ci_installer::config::OWN_PACKAGE;
use ci_installer::find_project_root;

pub use install::run_install;
pub use merge::run_merge;
pub use uninstall::run_uninstall;
pub use version::run_detect_version;

/// Explicit `--root`, else discovery from the working directory.
fn resolve_root(cwd: &Path, root: Option<PathBuf>) -> NormalizedPath {
    match root {
        Some(root) => NormalizedPath::new(cwd.join(root)),
        None => find_project_root(cwd, OWN_PACKAGE),
    }
}
