//! [`TestProject`] builder for installer scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sample `.lando.yml` with one existing hook, one existing tooling command
/// and an outdated `dev-config` definition.
pub const SAMPLE_LANDO: &str = "\
name: mysite
recipe: pantheon
config:
  framework: drupal10
  site: mysite
  webroot: web
events:
  post-start:
    - appserver: composer install
    - 'appserver: bash /app/lando/scripts/dev-config.sh enable'
tooling:
  drush:
    service: appserver
  dev-config:
    service: appserver
    description: Old description
    cmd: bash /app/scripts/old.sh
";

/// The packaged `files/` tree at the workspace root.
pub fn packaged_files() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../files")
}

/// A temporary Drupal project next to a private copy of the packaged files.
///
/// Layout: `<temp>/project` is the project root, `<temp>/package/files` the
/// source tree, so tests may delete or edit sources freely.
///
/// # Example
///
/// ```rust,no_run
/// use ci_test_utils::project::TestProject;
///
/// let project = TestProject::new().drupal("^10.3").lando_file().web_sites();
/// project.assert_file_exists("composer.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Empty project directory plus a fresh copy of the packaged files.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("project")).unwrap();
        copy_tree(&packaged_files(), &temp_dir.path().join("package/files"));
        Self { temp_dir }
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    pub fn source(&self) -> PathBuf {
        self.temp_dir.path().join("package/files")
    }

    /// Write `composer.json` requiring `drupal/core` at `constraint`.
    pub fn drupal(self, constraint: &str) -> Self {
        self.composer(&format!(
            "{{\n    \"name\": \"acme/site\",\n    \"type\": \"project\",\n    \"require\": {{\n        \"drupal/core\": \"{constraint}\"\n    }}\n}}\n"
        ))
    }

    pub fn composer(self, content: &str) -> Self {
        self.write("composer.json", content)
    }

    /// Write [`SAMPLE_LANDO`] as `.lando.yml`.
    pub fn lando_file(self) -> Self {
        self.write(".lando.yml", SAMPLE_LANDO)
    }

    /// Create `web/sites/default`.
    pub fn web_sites(self) -> Self {
        self.dir("web/sites/default")
    }

    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.root().join(rel)).unwrap();
        self
    }

    /// Write a file under the project root, creating parents.
    pub fn write(self, rel: &str, content: &str) -> Self {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn read(&self, rel: &str) -> String {
        let path = self.root().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Delete a file from the packaged source copy.
    pub fn remove_source(&self, rel: &str) {
        fs::remove_file(self.source().join(rel)).unwrap();
    }

    /// # Panics
    /// Panics if `rel` does not exist under the project root.
    pub fn assert_file_exists(&self, rel: &str) {
        let path = self.root().join(rel);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// # Panics
    /// Panics if `rel` exists under the project root.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let path = self.root().join(rel);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let actual = self.read(rel);
        assert!(
            actual.contains(content),
            "File {rel} does not contain expected content.\nExpected: {content}\nActual: {actual}"
        );
    }

    /// # Panics
    /// Panics unless the file mode has the owner-execute bit (Unix only).
    pub fn assert_executable(&self, rel: &str) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(self.root().join(rel)).unwrap().permissions().mode();
            assert!(mode & 0o100 != 0, "Expected {rel} to be executable, mode {mode:o}");
        }
        #[cfg(not(unix))]
        self.assert_file_exists(rel);
    }
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}
