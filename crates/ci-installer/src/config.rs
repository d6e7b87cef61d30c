//! Installer settings
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! yields the stock configuration.

use std::path::PathBuf;

use ci_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const OWN_PACKAGE: &str = "helloworlddevs/pantheon-ci-tools";
pub const DEV_PACKAGE: &str = "drupal/config_split";
pub const DEV_CONSTRAINT: &str = "^2.0";
pub const LANDO_FILE: &str = ".lando.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Drupal project receiving the files
    pub project_root: PathBuf,
    /// Packaged `files/` tree
    pub source_dir: PathBuf,
    /// Skipped during project-root discovery
    pub own_package: String,
    pub dev_package: String,
    pub dev_constraint: String,
    pub lando_file: String,
    /// Checked in order for `<webroot>/sites/default`
    pub webroots: Vec<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            source_dir: PathBuf::from("files"),
            own_package: OWN_PACKAGE.to_string(),
            dev_package: DEV_PACKAGE.to_string(),
            dev_constraint: DEV_CONSTRAINT.to_string(),
            lando_file: LANDO_FILE.to_string(),
            webroots: vec!["html".to_string(), "web".to_string()],
        }
    }
}

impl InstallerConfig {
    /// Load from a TOML, JSON or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source_dir = source.into();
        self
    }

    pub fn root(&self) -> NormalizedPath {
        NormalizedPath::new(&self.project_root)
    }

    pub fn source(&self) -> NormalizedPath {
        NormalizedPath::new(&self.source_dir)
    }

    pub fn lando_path(&self) -> NormalizedPath {
        self.root().join(&self.lando_file)
    }
}
