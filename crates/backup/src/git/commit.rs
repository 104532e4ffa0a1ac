// Stage everything in the backup repository and commit when the index differs
// from HEAD.

use chrono::{DateTime, Local};
use tracing::{error, info};

use super::worker::{CommandExecutor, GitWorker};
use crate::error::GitError;

/// Outcome of the commit step. Failures are captured, not propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { message: String },
    /// Staged set was empty after `git add .`.
    NothingToCommit,
    Failed(GitError),
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// `Backup: YYYY-MM-DD HH:MM` in local time.
pub fn commit_message(now: DateTime<Local>) -> String {
    format!("Backup: {}", now.format("%Y-%m-%d %H:%M"))
}

/// Commit pending backup changes, stamped with the current local time.
pub fn commit_if_changed<E: CommandExecutor>(worker: &GitWorker<E>) -> CommitOutcome {
    commit_if_changed_at(worker, Local::now())
}

pub fn commit_if_changed_at<E: CommandExecutor>(
    worker: &GitWorker<E>,
    now: DateTime<Local>,
) -> CommitOutcome {
    match stage_and_commit(worker, now) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(repo = %worker.repo_path().display(), error = %err, "git operation failed");
            CommitOutcome::Failed(err)
        }
    }
}

fn stage_and_commit<E: CommandExecutor>(
    worker: &GitWorker<E>,
    now: DateTime<Local>,
) -> Result<CommitOutcome, GitError> {
    worker.add_all()?;

    if !worker.has_staged_changes()? {
        info!("no changes to commit");
        return Ok(CommitOutcome::NothingToCommit);
    }

    let message = commit_message(now);
    worker.commit(&message)?;
    info!(%message, "committed changes");
    Ok(CommitOutcome::Committed { message })
}
