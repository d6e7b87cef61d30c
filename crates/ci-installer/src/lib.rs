//! Pantheon CI installer
//!
//! Copies the packaged CI files into a Drupal project and sets up the dev
//! config-split workflow: the `drupal/config_split` dev requirement, Lando
//! helper scripts, a version-appropriate `development.services.yml` and the
//! matching `.lando.yml` hooks and tooling commands.

pub mod config;
pub mod error;
pub mod installer;
pub mod lando;
pub mod manifest;
pub mod report;
pub mod root;
pub mod scaffold;
pub mod services;
pub mod uninstall;
pub mod version;

pub use config::InstallerConfig;
pub use error::{Error, Result};
pub use installer::{ConfigSplitReport, InstallReport, Installer};
pub use report::{FileAction, InstalledFile, StepOutcome};
pub use root::find_project_root;
