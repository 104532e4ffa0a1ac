// Workspace mirror: the backup copy is rebuilt from scratch on every run.

use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::file::copy_preserving_times;
use super::StepOutcome;
use crate::config::BackupConfig;
use crate::error::BackupError;

/// Replace the backed-up workspace with a fresh copy of the source workspace,
/// leaving out every entry named like the VCS marker.
pub fn backup_workspace(config: &BackupConfig) -> StepOutcome {
    let source = config.workspace_source();
    let destination = config.workspace_backup();

    if !source.exists() {
        warn!(source = %source.display(), "workspace directory not found");
        return StepOutcome::Missing(source);
    }

    match mirror_tree(&source, &destination, &config.vcs_marker) {
        Ok(files) => {
            info!(files, destination = %destination.display(), "backed up workspace");
            StepOutcome::Changed
        }
        Err(err) => {
            error!(error = %err, "failed to back up workspace");
            StepOutcome::Failed(err)
        }
    }
}

/// Copy `source` to `destination`, removing any existing `destination` first.
/// Entries named `skip` are pruned at every depth, contents included.
///
/// Returns the number of files copied.
pub fn mirror_tree(source: &Path, destination: &Path, skip: &str) -> Result<usize, BackupError> {
    if !source.is_dir() {
        return Err(BackupError::io(source, std::io::Error::other("not a directory")));
    }

    if destination.exists() {
        debug!(path = %destination.display(), "removing previous workspace backup");
        fs::remove_dir_all(destination).map_err(|e| BackupError::io(destination, e))?;
    }
    fs::create_dir_all(destination).map_err(|e| BackupError::io(destination, e))?;

    let walker = WalkDir::new(source)
        .follow_links(true)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != skip);

    let mut files = 0;
    for entry in walker {
        let entry =
            entry.map_err(|e| BackupError::Walk { path: source.to_path_buf(), source: e })?;
        let relative = entry.path().strip_prefix(source).map_err(|e| {
            BackupError::io(entry.path(), std::io::Error::other(e.to_string()))
        })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BackupError::io(&target, e))?;
        } else {
            copy_preserving_times(entry.path(), &target)?;
            files += 1;
        }
    }

    Ok(files)
}
