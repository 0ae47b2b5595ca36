//! Atomic artifact writer.
//!
//! ## `atomic_write` protocol
//!
//! 1. Render content (already done by caller).
//! 2. Normalise line endings to LF.
//! 3. Compare with current on-disk content → skip if identical.
//! 4. Write to `<path>.orgforge.tmp`.
//! 5. Rename to final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Write / remove results
// ---------------------------------------------------------------------------

/// Outcome of an individual artifact write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — rendered content matches what is on disk.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

/// Outcome of an individual artifact removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveResult {
    /// File existed and was removed.
    Removed { path: PathBuf },
    /// File was already absent; removal is a logged no-op.
    Missing { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been removed.
    WouldRemove { path: PathBuf },
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically write a single rendered artifact.
///
/// Returns [`WriteResult`] indicating whether the file was written or skipped.
pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.orgforge.tmp", path.display()));
    atomic_write_with_tmp(path, content, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    // Normalise line endings to LF before comparing and writing.
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();

    // Step 3: compare with current on-disk content. Bytes, not text; the
    // existing file may not be UTF-8.
    match std::fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(io_err(path, err)),
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    // Step 4: ensure parent directory exists, write to .tmp.
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    // Step 5: atomic rename to final path.
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// remove_artifact_file
// ---------------------------------------------------------------------------

/// Remove a previously generated artifact.
///
/// An absent file is not an error: the resource was never rendered or was
/// already cleaned up, so the removal is logged and reported as
/// [`RemoveResult::Missing`].
pub(crate) fn remove_artifact_file(path: &Path, dry_run: bool) -> Result<RemoveResult, SyncError> {
    if !path.exists() {
        tracing::warn!("artifact not found for deletion: {}", path.display());
        return Ok(RemoveResult::Missing {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would remove: {}", path.display());
        return Ok(RemoveResult::WouldRemove {
            path: path.to_path_buf(),
        });
    }

    std::fs::remove_file(path).map_err(|e| io_err(path, e))?;
    tracing::info!("removed: {}", path.display());
    Ok(RemoveResult::Removed {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
