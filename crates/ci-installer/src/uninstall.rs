//! Remove installed files
//!
//! `.lando.yml` and `composer.json` edits are left in place; the hooks and
//! tooling commands may have been customized since.

use ci_fs::{CiPath, NormalizedPath, io};
use tracing::{info, warn};

use crate::lando::LANDO_SCRIPTS;
use crate::scaffold;

#[derive(Debug, Default)]
pub struct UninstallReport {
    /// Removed files, relative to the root
    pub removed: Vec<String>,
    pub dirs_removed: Vec<String>,
    /// Files that exist but could not be deleted
    pub failed: Vec<(String, ci_fs::Error)>,
}

/// Every file the installer may have written, relative to the root.
pub fn installed_files() -> Vec<String> {
    LANDO_SCRIPTS
        .iter()
        .map(|script| format!("{}/{script}", CiPath::LandoScripts))
        .chain(scaffold::default_manifest().iter().map(|file| file.dest()))
        .collect()
}

/// Delete installed files and the directories they leave empty.
pub fn cleanup(root: &NormalizedPath) -> UninstallReport {
    let mut report = UninstallReport::default();

    for rel in installed_files() {
        match io::remove_file_if_exists(&root.join(&rel)) {
            Ok(true) => {
                info!(path = %rel, "removed");
                report.removed.push(rel);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %rel, error = %e, "could not remove");
                report.failed.push((rel, e));
            }
        }
    }

    for dir in CiPath::cleanup_order() {
        match io::remove_dir_if_empty(&root.join(dir.as_str())) {
            Ok(true) => {
                info!(path = %dir, "removed empty directory");
                report.dirs_removed.push(dir.to_string());
            }
            Ok(false) => {}
            Err(e) => warn!(path = %dir, error = %e, "could not remove directory"),
        }
    }

    report
}
