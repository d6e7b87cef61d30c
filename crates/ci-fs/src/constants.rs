//! Standard locations the installer manages inside a host project.

use std::path::Path;

/// Directories created or cleaned up by the installer, relative to the
/// project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiPath {
    /// CircleCI pipeline directory
    CircleCi,
    /// GitHub Actions workflow directory
    GithubWorkflows,
    /// The `.ci` root
    CiRoot,
    /// CI helper scripts
    CiScripts,
    /// The `.ci/test` directory
    CiTest,
    /// Playwright visual regression harness
    VisualRegression,
    /// Scripts invoked by Lando tooling and events
    LandoScripts,
}

impl CiPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CircleCi => ".circleci",
            Self::GithubWorkflows => ".github/workflows",
            Self::CiRoot => ".ci",
            Self::CiScripts => ".ci/scripts",
            Self::CiTest => ".ci/test",
            Self::VisualRegression => ".ci/test/visual-regression",
            Self::LandoScripts => "lando/scripts",
        }
    }

    /// Directories removed on uninstall, deepest first so parents are
    /// empty by the time they are checked.
    pub fn cleanup_order() -> [CiPath; 5] {
        [
            Self::VisualRegression,
            Self::CiTest,
            Self::CiScripts,
            Self::CiRoot,
            Self::LandoScripts,
        ]
    }
}

impl AsRef<Path> for CiPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for CiPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for CiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
