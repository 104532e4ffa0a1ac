use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs git inside the backup repository.
#[derive(Debug, Clone)]
pub struct GitWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    executor: E,
}

impl GitWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self { repo_path: repo_path.into(), executor: ProcessCommandExecutor }
    }
}

impl<E: CommandExecutor> GitWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self { repo_path: repo_path.into(), executor }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// `git add .`
    pub fn add_all(&self) -> Result<GitCommandOutput, GitError> {
        self.run(vec!["add".to_string(), ".".to_string()])
    }

    /// `git diff --cached --quiet`: exit 0 means nothing staged, exit 1
    /// means staged changes. Any other status is an error.
    pub fn has_staged_changes(&self) -> Result<bool, GitError> {
        let args = vec!["diff".to_string(), "--cached".to_string(), "--quiet".to_string()];
        let result = self.execute(&args)?;
        match result.code {
            Some(0) if result.success => Ok(false),
            Some(1) => Ok(true),
            code => Err(GitError::CommandFailed {
                command: command_line(&args),
                code,
                stderr: pick_stderr(result),
            }),
        }
    }

    pub fn commit(&self, message: &str) -> Result<GitCommandOutput, GitError> {
        self.run(vec!["commit".to_string(), "-m".to_string(), message.to_string()])
    }

    fn run(&self, args: Vec<String>) -> Result<GitCommandOutput, GitError> {
        let result = self.execute(&args)?;

        if result.success {
            return Ok(GitCommandOutput { stdout: result.stdout, stderr: result.stderr });
        }

        let code = result.code;
        Err(GitError::CommandFailed { command: command_line(&args), code, stderr: pick_stderr(result) })
    }

    fn execute(&self, args: &[String]) -> Result<CommandResult, GitError> {
        self.executor.execute("git", args, &self.repo_path).map_err(|error| {
            GitError::SpawnFailed { command: command_line(args), message: error.to_string() }
        })
    }
}

fn command_line(args: &[String]) -> String {
    format!("git {}", args.join(" "))
}

fn pick_stderr(result: CommandResult) -> String {
    if result.stderr.trim().is_empty() {
        result.stdout
    } else {
        result.stderr
    }
}
