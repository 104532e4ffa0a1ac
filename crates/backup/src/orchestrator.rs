// One backup pass: manifest files, then the workspace, then a commit if
// anything was written.

use tracing::info;

use crate::backup::file::backup_file;
use crate::backup::workspace::backup_workspace;
use crate::backup::StepOutcome;
use crate::config::{BackupConfig, ManifestEntry};
use crate::exit_code::ExitCode;
use crate::git::commit::{commit_if_changed, CommitOutcome};
use crate::git::worker::{CommandExecutor, GitWorker, ProcessCommandExecutor};

/// Outcome of a single manifest entry.
#[derive(Debug)]
pub struct FileReport {
    pub entry: ManifestEntry,
    pub outcome: StepOutcome,
}

/// Everything a run did, in execution order.
#[derive(Debug)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub workspace: StepOutcome,
    /// `None` when no step changed anything and the commit step was skipped.
    pub commit: Option<CommitOutcome>,
}

impl RunReport {
    pub fn changed(&self) -> bool {
        self.files.iter().any(|file| file.outcome.changed()) || self.workspace.changed()
    }

    /// The commit result never affects the exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_changed(self.changed())
    }
}

pub struct Backup<E = ProcessCommandExecutor> {
    config: BackupConfig,
    git: GitWorker<E>,
}

impl Backup<ProcessCommandExecutor> {
    pub fn new(config: BackupConfig) -> Self {
        let git = GitWorker::new(config.backup_root.clone());
        Self { config, git }
    }
}

impl<E: CommandExecutor> Backup<E> {
    pub fn with_executor(config: BackupConfig, executor: E) -> Self {
        let git = GitWorker::with_executor(config.backup_root.clone(), executor);
        Self { config, git }
    }

    /// Run every step in order. Never fails: step errors are logged and
    /// recorded in the report.
    pub fn run(&self) -> RunReport {
        info!(
            source = %self.config.source_root.display(),
            destination = %self.config.backup_root.display(),
            "starting config backup"
        );

        let mut changed = false;

        let mut files = Vec::with_capacity(self.config.manifest.len());
        for entry in &self.config.manifest {
            let outcome = backup_file(&self.config, entry);
            changed |= outcome.changed();
            files.push(FileReport { entry: entry.clone(), outcome });
        }

        let workspace = backup_workspace(&self.config);
        changed |= workspace.changed();

        let commit = if changed { Some(commit_if_changed(&self.git)) } else { None };

        info!(changed, "backup completed");
        RunReport { files, workspace, commit }
    }
}
