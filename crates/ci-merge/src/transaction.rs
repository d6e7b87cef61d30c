//! Backup, merge, write, restore-on-failure
//!
//! ```text
//! Start ── no file ──────────────────────────────▶ NoSource
//!   │
//!   ├── backup fails ───────────────────────────▶ Aborted
//!   ▼
//! BackedUp ── parse/merge/serialize fails ──────▶ Aborted
//!   │
//!   ├── write ok ───────────────────────────────▶ Written
//!   ▼
//! WriteFailed ── restore ok ────────────────────▶ Restored
//!   └─────────── restore fails ─────────────────▶ RestoreFailed
//! ```
//!
//! The target is touched at most twice: the backup copy and the final
//! write (plus the restore when that write fails). The `.bak` file is left
//! on disk in every state after `BackedUp`.

use ci_fs::backup::{self, BACKUP_SUFFIX};
use ci_fs::{NormalizedPath, io};
use similar::TextDiff;
use tracing::{debug, error, info, warn};

use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::plan::MergePlan;
use crate::policy::{self, MergeStats};

/// Performs the final write and the restore of a transaction.
pub trait DocumentWriter {
    fn write(&self, path: &NormalizedPath, content: &str) -> ci_fs::Result<()>;

    /// Copy the backup over the target after a failed write.
    fn restore(&self, backup: &NormalizedPath, target: &NormalizedPath) -> ci_fs::Result<()> {
        backup::restore_backup(backup, target)
    }
}

/// Writes through [`ci_fs::io::write_atomic`], keeping the target's
/// permission bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicWriter;

impl DocumentWriter for AtomicWriter {
    fn write(&self, path: &NormalizedPath, content: &str) -> ci_fs::Result<()> {
        io::write_text(path, content)
    }
}

/// Settings fixed when the transaction is built.
pub struct TransactionConfig {
    /// Appended to the target file name to form the backup path
    pub backup_suffix: String,
    pub writer: Box<dyn DocumentWriter>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            backup_suffix: BACKUP_SUFFIX.to_string(),
            writer: Box::new(AtomicWriter),
        }
    }
}

impl TransactionConfig {
    pub fn with_writer(writer: impl DocumentWriter + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for TransactionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionConfig")
            .field("backup_suffix", &self.backup_suffix)
            .finish_non_exhaustive()
    }
}

/// Where a transaction currently is. See the module docs for transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Start,
    NoSource,
    BackedUp,
    Aborted,
    Written,
    WriteFailed,
    Restored,
    RestoreFailed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub path: NormalizedPath,
    pub backup: NormalizedPath,
    /// False when the merged text is byte-identical to the original
    pub changed: bool,
    pub stats: MergeStats,
}

/// Merged output computed without touching the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub rendered: String,
    /// Unified diff from the current content to `rendered`
    pub diff: String,
    pub changed: bool,
    pub stats: MergeStats,
}

/// One backup/merge/write run against a single file.
#[derive(Debug)]
pub struct SafeWrite {
    target: NormalizedPath,
    backup: NormalizedPath,
    config: TransactionConfig,
    state: TransactionState,
}

impl SafeWrite {
    pub fn new(target: impl Into<NormalizedPath>, config: TransactionConfig) -> Self {
        let target = target.into();
        let backup = backup::backup_path(&target, &config.backup_suffix);
        Self {
            target,
            backup,
            config,
            state: TransactionState::Start,
        }
    }

    pub fn target(&self) -> &NormalizedPath {
        &self.target
    }

    pub fn backup_path(&self) -> &NormalizedPath {
        &self.backup
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    fn transition(&mut self, next: TransactionState) {
        debug!(path = %self.target, from = ?self.state, to = ?next, "transaction state");
        self.state = next;
    }

    /// Run the full transaction.
    pub fn run(&mut self, plan: &MergePlan) -> Result<MergeReport> {
        if !self.target.is_file() {
            self.transition(TransactionState::NoSource);
            warn!(path = %self.target, "target not found; skipping merge");
            return Err(Error::MissingInput {
                path: self.target.to_native(),
            });
        }

        if let Err(source) = backup::create_backup(&self.target, &self.backup) {
            self.transition(TransactionState::Aborted);
            error!(path = %self.target, error = %source, "failed to create backup copy");
            return Err(Error::Backup {
                path: self.target.to_native(),
                source,
            });
        }
        self.transition(TransactionState::BackedUp);

        let (original, rendered, stats) = match self.render(plan) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.transition(TransactionState::Aborted);
                error!(path = %self.target, error = %e, "merge aborted before write");
                return Err(e);
            }
        };

        match self.config.writer.write(&self.target, &rendered) {
            Ok(()) => {
                self.transition(TransactionState::Written);
                info!(
                    path = %self.target,
                    hooks_added = stats.hooks_added(),
                    commands_written = stats.commands_written,
                    "merged configuration"
                );
                Ok(MergeReport {
                    path: self.target.clone(),
                    backup: self.backup.clone(),
                    changed: original != rendered,
                    stats,
                })
            }
            Err(write_error) => {
                self.transition(TransactionState::WriteFailed);
                error!(path = %self.target, error = %write_error, "failed to write changes");
                self.recover(write_error)
            }
        }
    }

    /// Compute the merged text and a diff without backup or write.
    pub fn preview(&self, plan: &MergePlan) -> Result<Preview> {
        let (original, rendered, stats) = self.render(plan)?;
        let diff = TextDiff::from_lines(&original, &rendered)
            .unified_diff()
            .header(self.target.as_str(), self.target.as_str())
            .to_string();
        Ok(Preview {
            changed: original != rendered,
            rendered,
            diff,
            stats,
        })
    }

    /// Read, parse, merge and serialize. Returns `(original, rendered, stats)`.
    fn render(&self, plan: &MergePlan) -> Result<(String, String, MergeStats)> {
        let (original, mut doc) = ConfigDocument::load(&self.target)?;
        let stats = policy::apply(&mut doc, plan)?;
        let rendered = doc.serialize()?;
        Ok((original, rendered, stats))
    }

    fn recover(&mut self, write_error: ci_fs::Error) -> Result<MergeReport> {
        match self.config.writer.restore(&self.backup, &self.target) {
            Ok(()) => {
                self.transition(TransactionState::Restored);
                warn!(path = %self.target, "restored original content from backup");
                Err(Error::Write {
                    path: self.target.to_native(),
                    source: write_error,
                })
            }
            Err(restore_error) => {
                self.transition(TransactionState::RestoreFailed);
                error!(
                    path = %self.target,
                    backup = %self.backup,
                    error = %restore_error,
                    "failed to restore backup; manual recovery required"
                );
                Err(Error::RestoreFailed {
                    path: self.target.to_native(),
                    backup: self.backup.to_native(),
                    write_error,
                    restore_error,
                })
            }
        }
    }
}
