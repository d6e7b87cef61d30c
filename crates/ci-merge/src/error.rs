//! Error types for ci-merge

use std::path::PathBuf;

/// Result type for ci-merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, merging or writing a document
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Target file does not exist; nothing was touched
    #[error("{path} not found; skipping merge")]
    MissingInput { path: PathBuf },

    /// Target could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ci_fs::Error,
    },

    /// Content is not YAML, or its top level is not a mapping
    #[error("Failed to parse YAML from {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A section exists but holds the wrong kind of node
    #[error("Expected `{section}` to be a {expected}, found {found}")]
    Shape {
        section: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Encoder refused the merged tree
    #[error("Failed to serialize merged YAML: {message}")]
    Serialize { message: String },

    /// Backup copy could not be created; nothing was mutated
    #[error("Failed to create backup copy of {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: ci_fs::Error,
    },

    /// Merged content could not be written; the original was restored
    #[error("Failed to write changes to {path}: {source}; restored original content")]
    Write {
        path: PathBuf,
        #[source]
        source: ci_fs::Error,
    },

    /// Write failed and so did the restore. The target may be damaged.
    #[error(
        "Failed to write changes to {path} ({write_error}) and failed to restore the backup \
         ({restore_error}); manually copy {backup} to {path}"
    )]
    RestoreFailed {
        path: PathBuf,
        backup: PathBuf,
        write_error: ci_fs::Error,
        restore_error: ci_fs::Error,
    },
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn shape(section: impl Into<String>, expected: &'static str, found: &serde_yaml::Value) -> Self {
        Self::Shape {
            section: section.into(),
            expected,
            found: crate::document::kind_name(found),
        }
    }

    /// True only when the target file may have been left damaged and the
    /// user has to recover it by hand.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::RestoreFailed { .. })
    }
}
