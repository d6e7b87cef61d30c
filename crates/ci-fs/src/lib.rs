//! Filesystem primitives for the CI tools installer
//!
//! Provides forward-slash path handling, locked atomic writes, sibling
//! backups and the standard scaffold locations inside a host project.

pub mod backup;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::CiPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
