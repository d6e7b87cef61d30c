//! Outcome types shared by the install steps

use std::fmt;

use crate::error::Error;

/// What happened to a single installed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Destination did not exist before
    Installed,
    /// Destination existed and was overwritten
    Updated,
    /// Destination already held identical bytes
    Unchanged,
    /// Destination existed and is only written once
    Skipped,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Installed => "Installed",
            Self::Updated => "Updated",
            Self::Unchanged => "Unchanged",
            Self::Skipped => "Skipped",
        };
        f.write_str(label)
    }
}

/// A file written (or deliberately not written) under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    /// Path relative to the project root
    pub path: String,
    pub action: FileAction,
    pub executable: bool,
}

/// Result of one step of the config-split stage.
#[derive(Debug)]
pub enum StepOutcome<T> {
    Done(T),
    Failed(Error),
    /// An earlier step failed and this one was not attempted
    NotRun,
}

impl<T> StepOutcome<T> {
    pub fn from_result(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => Self::Done(value),
            Err(e) => Self::Failed(e),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn done(&self) -> Option<&T> {
        match self {
            Self::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}
