// Log sinks: standard output plus `<backup-root>/backup.log` (append).
//
// Line format: `2026-03-07 09:05:42,123 - openclaw_backup - INFO - message fields`

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{warn, Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::BackupConfig;

/// Formats events as `timestamp - logger - LEVEL - message`.
#[derive(Debug, Clone)]
pub struct BackupFormatter {
    logger_name: String,
}

impl BackupFormatter {
    pub fn new(logger_name: impl Into<String>) -> Self {
        Self { logger_name: logger_name.into() }
    }
}

impl<S, N> FormatEvent<S, N> for BackupFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            self.logger_name,
            level_name(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

/// Install the global subscriber. Falls back to stdout only when the log
/// file cannot be opened.
pub fn init(config: &BackupConfig) -> Result<()> {
    let formatter = BackupFormatter::new(&config.logger_name);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(formatter.clone())
        .with_ansi(false)
        .with_writer(std::io::stdout);

    let log_path = config.log_path();
    let (file_layer, file_error) = match open_log_file(&log_path) {
        Ok(file) => {
            let layer = tracing_subscriber::fmt::layer()
                .event_format(formatter)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        Err(error) => (None, Some(error)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(error) = file_error {
        let error = format!("{error:#}");
        warn!(path = %log_path.display(), %error, "log file unavailable, logging to stdout only");
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
