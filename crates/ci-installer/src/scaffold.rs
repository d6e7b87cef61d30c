//! Copy the packaged CI files into a project
//!
//! The file list is fixed. Sources are checked before anything is copied,
//! so a broken package never leaves a half-populated project behind.

use ci_fs::checksum::files_match;
use ci_fs::{CiPath, NormalizedPath, io};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::report::{FileAction, InstalledFile};

/// Whether an existing destination may be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPolicy {
    Always,
    /// Project-owned after the first install
    IfAbsent,
}

/// One packaged file and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    /// Relative to the packaged `files/` directory
    pub source: &'static str,
    /// Destination directory; `None` is the project root
    pub dir: Option<CiPath>,
    pub name: &'static str,
    pub policy: CopyPolicy,
}

impl ScaffoldFile {
    fn new(source: &'static str, dir: Option<CiPath>, name: &'static str) -> Self {
        Self {
            source,
            dir,
            name,
            policy: CopyPolicy::Always,
        }
    }

    fn once(self) -> Self {
        Self {
            policy: CopyPolicy::IfAbsent,
            ..self
        }
    }

    /// Destination relative to the project root.
    pub fn dest(&self) -> String {
        match self.dir {
            Some(dir) => format!("{}/{}", dir, self.name),
            None => self.name.to_string(),
        }
    }
}

/// The packaged CI file set.
pub fn default_manifest() -> Vec<ScaffoldFile> {
    use CiPath::*;

    vec![
        ScaffoldFile::new(".circleci/config.yml", Some(CircleCi), "config.yml"),
        ScaffoldFile::new(
            "github/delete-multidev-on-merge.yml",
            Some(GithubWorkflows),
            "delete-multidev-on-merge.yml",
        ),
        ScaffoldFile::new("test_routes.json", None, "test_routes.json").once(),
        ScaffoldFile::new(".circleci/env_vars.sh", Some(CircleCi), "env_vars.sh").once(),
        ScaffoldFile::new(
            "github/pr-comments-to-jira.yml",
            Some(GithubWorkflows),
            "pr-comments-to-jira.yml",
        ),
        ScaffoldFile::new("scripts/dev-multidev.sh", Some(CiScripts), "dev-multidev.sh"),
        ScaffoldFile::new(
            "scripts/post_multidev_url.sh",
            Some(CiScripts),
            "post_multidev_url.sh",
        ),
        ScaffoldFile::new("scripts/setup_vars.sh", Some(CiScripts), "setup_vars.sh"),
        ScaffoldFile::new(
            ".ci/test/visual-regression/playwright.config.js",
            Some(VisualRegression),
            "playwright.config.js",
        ),
        ScaffoldFile::new(
            ".ci/test/visual-regression/playwright-tests.spec.js",
            Some(VisualRegression),
            "playwright-tests.spec.js",
        ),
        ScaffoldFile::new(
            ".ci/test/visual-regression/run-playwright",
            Some(VisualRegression),
            "run-playwright",
        ),
        ScaffoldFile::new(
            ".ci/test/visual-regression/package.json",
            Some(VisualRegression),
            "package.json",
        ),
        ScaffoldFile::new(
            ".ci/test/visual-regression/package-lock.json",
            Some(VisualRegression),
            "package-lock.json",
        ),
    ]
}

/// Scripts get the executable bit.
pub fn is_executable_name(name: &str) -> bool {
    name.contains(".sh") || name.starts_with("run-") || name.starts_with("dev-multidev")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub files: Vec<InstalledFile>,
    /// Directories that did not exist before, relative to the root
    pub dirs_created: Vec<String>,
}

impl ScaffoldReport {
    pub fn count(&self, action: FileAction) -> usize {
        self.files.iter().filter(|f| f.action == action).count()
    }
}

/// Copy `manifest` from `source` into `root`.
pub fn scaffold(
    source: &NormalizedPath,
    root: &NormalizedPath,
    manifest: &[ScaffoldFile],
) -> Result<ScaffoldReport> {
    if let Some(missing) = manifest
        .iter()
        .map(|file| source.join(file.source))
        .find(|path| !path.is_file())
    {
        return Err(Error::SourceMissing {
            path: missing.to_native(),
        });
    }

    let mut report = ScaffoldReport::default();
    for dir in [CiPath::CircleCi, CiPath::VisualRegression, CiPath::CiScripts] {
        if io::ensure_dir(&root.join(dir.as_str()))? {
            report.dirs_created.push(dir.to_string());
        }
    }

    for file in manifest {
        let from = source.join(file.source);
        let rel = file.dest();
        let to = root.join(&rel);
        let executable = is_executable_name(file.name);

        let action = match (to.is_file(), file.policy) {
            (true, CopyPolicy::IfAbsent) => {
                info!(path = %rel, "skipped; file already exists");
                report.files.push(InstalledFile {
                    path: rel,
                    action: FileAction::Skipped,
                    executable: false,
                });
                continue;
            }
            (true, _) if files_match(&from.to_native(), &to.to_native()) => FileAction::Unchanged,
            (true, _) => FileAction::Updated,
            (false, _) => FileAction::Installed,
        };

        if let Some(parent) = to.parent()
            && io::ensure_dir(&parent)?
        {
            report.dirs_created.push(parent.display_relative(root));
        }
        if action != FileAction::Unchanged {
            io::copy_file(&from, &to)?;
        }
        if executable {
            io::set_executable(&to)?;
            debug!(path = %rel, "made executable");
        }
        info!(path = %rel, action = %action, "copied");

        report.files.push(InstalledFile {
            path: rel,
            action,
            executable,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("setup_vars.sh", true)]
    #[case("env_vars.sh", true)]
    #[case("run-playwright", true)]
    #[case("dev-multidev.sh", true)]
    #[case("dev-multidev", true)]
    #[case("config.yml", false)]
    #[case("package.json", false)]
    #[case("playwright.config.js", false)]
    fn executable_rule(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_executable_name(name), expected);
    }

    #[test]
    fn manifest_destinations_are_unique() {
        let manifest = default_manifest();
        let mut dests: Vec<String> = manifest.iter().map(ScaffoldFile::dest).collect();
        dests.sort();
        dests.dedup();
        assert_eq!(dests.len(), manifest.len());
    }

    #[test]
    fn project_owned_files_are_copied_once() {
        let once: Vec<String> = default_manifest()
            .iter()
            .filter(|f| f.policy == CopyPolicy::IfAbsent)
            .map(ScaffoldFile::dest)
            .collect();
        assert_eq!(once, vec!["test_routes.json", ".circleci/env_vars.sh"]);
    }
}
