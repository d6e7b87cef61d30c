//! Sibling backup copies
//!
//! A backup is a byte-for-byte copy of a file placed next to it with a
//! suffix appended (`.lando.yml` -> `.lando.yml.bak`). Backups are never
//! deleted here; their lifecycle ends with the caller.

use std::fs;

use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// Default suffix appended to backed up file names.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Compute the backup location for `target` using `suffix`.
pub fn backup_path(target: &NormalizedPath, suffix: &str) -> NormalizedPath {
    NormalizedPath::new(format!("{}{}", target.as_str(), suffix))
}

/// Copy `target` to `backup`, replacing any previous backup.
pub fn create_backup(target: &NormalizedPath, backup: &NormalizedPath) -> Result<()> {
    if !target.is_file() {
        return Err(Error::BackupSourceMissing {
            path: target.to_native(),
        });
    }
    fs::copy(target.to_native(), backup.to_native())
        .map_err(|e| Error::io(backup.to_native(), e))?;
    debug!(target = %target, backup = %backup, "created backup");
    Ok(())
}

/// Put the content of `backup` back at `target`.
///
/// Uses a plain copy rather than the atomic writer so a restore does not
/// depend on the code path that just failed.
pub fn restore_backup(backup: &NormalizedPath, target: &NormalizedPath) -> Result<()> {
    let content = fs::read(backup.to_native()).map_err(|e| Error::io(backup.to_native(), e))?;
    fs::write(target.to_native(), content).map_err(|e| Error::io(target.to_native(), e))?;
    debug!(target = %target, backup = %backup, "restored from backup");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn backup_path_appends_suffix() {
        let target = NormalizedPath::new("/project/.lando.yml");
        assert_eq!(
            backup_path(&target, BACKUP_SUFFIX).as_str(),
            "/project/.lando.yml.bak"
        );
    }

    #[test]
    fn backup_then_restore_round_trips_content() {
        let temp = TempDir::new().unwrap();
        let target = NormalizedPath::new(temp.path().join(".lando.yml"));
        let backup = backup_path(&target, BACKUP_SUFFIX);
        fs::write(target.to_native(), "name: site\n").unwrap();

        create_backup(&target, &backup).unwrap();
        fs::write(target.to_native(), "garbage").unwrap();
        restore_backup(&backup, &target).unwrap();

        assert_eq!(fs::read_to_string(target.to_native()).unwrap(), "name: site\n");
        assert!(backup.is_file(), "backup stays on disk after restore");
    }

    #[test]
    fn backup_of_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let target = NormalizedPath::new(temp.path().join("absent.yml"));
        let backup = backup_path(&target, BACKUP_SUFFIX);

        let err = create_backup(&target, &backup).unwrap_err();
        assert!(matches!(err, Error::BackupSourceMissing { .. }));
        assert!(!backup.exists());
    }
}
