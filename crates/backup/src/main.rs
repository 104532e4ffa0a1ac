// openclaw-backup: one backup pass per invocation.

use std::process;

use openclaw_backup::config::BackupConfig;
use openclaw_backup::logging;
use openclaw_backup::orchestrator::Backup;

fn main() -> process::ExitCode {
    let config = BackupConfig::default();

    if let Err(error) = logging::init(&config) {
        eprintln!("openclaw-backup: {error:#}");
    }

    Backup::new(config).run().exit_code().into()
}
