//! Clearing the card once its photos are safely on the remote

use crate::error::Result;
use dialoguer::Confirm;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directories removed and those that could not be
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Remove every top-level directory under `source_dir`, contents included
///
/// Loose files at the top level are kept. Failing to remove a directory is
/// logged and does not stop the others.
pub fn cleanup_source_dirs(source_dir: &Path) -> Result<CleanupSummary> {
    let mut summary = CleanupSummary::default();

    let mut dirs = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    for dir in dirs {
        debug!(dir = %dir.display(), "Removing directory during cleanup");
        match fs::remove_dir_all(&dir) {
            Ok(()) => summary.removed.push(dir),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to remove directory during cleanup");
                summary.failed.push(dir);
            }
        }
    }

    Ok(summary)
}

/// Ask before clearing the source; dry runs never prompt or delete
///
/// Returns `None` when cleanup did not run.
pub fn confirm_and_cleanup(
    source_dir: &Path,
    dry_run: bool,
    assume_yes: bool,
) -> Result<Option<CleanupSummary>> {
    if dry_run {
        info!("Dry run complete. No files were actually moved or deleted.");
        return Ok(None);
    }

    let confirmed = assume_yes
        || Confirm::new()
            .with_prompt("Cleanup source directories?")
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read cleanup confirmation");
                false
            });

    if !confirmed {
        info!("Skipping cleanup of source directories");
        return Ok(None);
    }

    let summary = cleanup_source_dirs(source_dir)?;
    info!(
        removed = summary.removed.len(),
        failed = summary.failed.len(),
        "Source directories cleaned up"
    );
    Ok(Some(summary))
}
