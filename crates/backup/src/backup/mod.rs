// Backup steps: single files and the workspace tree.

pub mod file;
pub mod workspace;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::error::BackupError;

/// Result of one backup step. Failures are captured here, never propagated.
#[derive(Debug)]
pub enum StepOutcome {
    /// The destination was written.
    Changed,
    /// The source does not exist. Expected for optional files.
    Missing(PathBuf),
    /// Reading, transforming or writing failed.
    Failed(BackupError),
}

impl StepOutcome {
    /// Whether this step contributes to the run-level changed flag.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Changed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<Result<(), BackupError>> for StepOutcome {
    fn from(result: Result<(), BackupError>) -> Self {
        match result {
            Ok(()) => Self::Changed,
            Err(error) => Self::Failed(error),
        }
    }
}

impl Display for StepOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Changed => write!(f, "changed"),
            Self::Missing(path) => write!(f, "missing source {}", path.display()),
            Self::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}
