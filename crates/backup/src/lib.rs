// openclaw-backup library: sanitized config backup into a git repository.

pub mod backup;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod git;
pub mod logging;
pub mod orchestrator;
pub mod sanitize;
