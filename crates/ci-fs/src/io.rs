//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;
use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// Permission bits applied to created directories and executable scripts.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    // Ensure parent directory exists
    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file lives next to the target so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;
    drop(temp_file);

    // Keep the target's mode across the rename
    if let Ok(existing) = fs::metadata(&native_path)
        && let Err(e) = fs::set_permissions(&temp_path, existing.permissions())
    {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Create a directory and all of its parents with mode `0755`.
///
/// Every level that did not exist gets the mode, not just the leaf.
/// Returns `true` when the directory had to be created.
pub fn ensure_dir(path: &NormalizedPath) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    let native_path = path.to_native();
    let missing: Vec<_> = native_path
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .map(|dir| dir.to_path_buf())
        .collect();

    fs::create_dir_all(&native_path).map_err(|e| Error::io(&native_path, e))?;
    for dir in missing.iter().rev() {
        set_mode(&NormalizedPath::new(dir), EXECUTABLE_MODE)?;
    }
    debug!(path = %path, levels = missing.len(), "created directory");
    Ok(true)
}

/// Copy `source` over `dest`, creating the destination directory if needed.
pub fn copy_file(source: &NormalizedPath, dest: &NormalizedPath) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(&parent)?;
    }
    fs::copy(source.to_native(), dest.to_native()).map_err(|e| Error::io(dest.to_native(), e))?;
    Ok(())
}

/// Mark a file as executable (`0755`). No-op on non-Unix targets.
pub fn set_executable(path: &NormalizedPath) -> Result<()> {
    set_mode(path, EXECUTABLE_MODE)
}

#[cfg(unix)]
fn set_mode(path: &NormalizedPath, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let native_path = path.to_native();
    fs::set_permissions(&native_path, fs::Permissions::from_mode(mode))
        .map_err(|e| Error::io(&native_path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &NormalizedPath, _mode: u32) -> Result<()> {
    Ok(())
}

/// Remove a file if it exists. Returns `true` when something was removed.
pub fn remove_file_if_exists(path: &NormalizedPath) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    let native_path = path.to_native();
    fs::remove_file(&native_path).map_err(|e| Error::io(&native_path, e))?;
    Ok(true)
}

/// Remove a directory only when it has no entries left.
///
/// Returns `true` when the directory was removed.
pub fn remove_dir_if_empty(path: &NormalizedPath) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let native_path = path.to_native();
    let mut entries = fs::read_dir(&native_path).map_err(|e| Error::io(&native_path, e))?;
    if entries.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(&native_path).map_err(|e| Error::io(&native_path, e))?;
    Ok(true)
}
