// Single-file backup: JSON is sanitized, anything else is copied as-is.

use std::fs::{self, File, FileTimes};
use std::path::Path;

use serde_json::Value;
use tracing::{error, info, warn};

use super::StepOutcome;
use crate::config::{BackupConfig, ManifestEntry, SensitiveKeys};
use crate::error::BackupError;
use crate::sanitize::sanitize;

/// Back up one manifest entry from the source root into the backup root.
///
/// A missing source is logged as a warning and reported as
/// [`StepOutcome::Missing`] without touching the destination.
pub fn backup_file(config: &BackupConfig, entry: &ManifestEntry) -> StepOutcome {
    let source = config.source_path(&entry.source);
    let destination = config.backup_path(&entry.destination);

    if !source.exists() {
        warn!(source = %source.display(), "source file not found");
        return StepOutcome::Missing(source);
    }

    match copy_entry(entry, &source, &destination, &config.sensitive_keys) {
        Ok(()) => {
            info!(source = %entry.source, destination = %entry.destination, "backed up file");
            StepOutcome::Changed
        }
        Err(err) => {
            error!(source = %entry.source, error = %err, "failed to back up file");
            StepOutcome::Failed(err)
        }
    }
}

fn copy_entry(
    entry: &ManifestEntry,
    source: &Path,
    destination: &Path,
    keys: &SensitiveKeys,
) -> Result<(), BackupError> {
    ensure_parent(destination)?;
    if entry.is_json() {
        write_sanitized_json(source, destination, keys)
    } else {
        copy_preserving_times(source, destination)
    }
}

/// Parse `source` as one JSON document, redact it and write it with
/// two-space indentation, replacing `destination`.
pub fn write_sanitized_json(
    source: &Path,
    destination: &Path,
    keys: &SensitiveKeys,
) -> Result<(), BackupError> {
    let contents = fs::read_to_string(source).map_err(|e| BackupError::io(source, e))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| BackupError::Parse { path: source.to_path_buf(), source: e })?;

    let sanitized = sanitize(&value, keys);
    let rendered = serde_json::to_string_pretty(&sanitized)
        .map_err(|e| BackupError::Serialize { path: destination.to_path_buf(), source: e })?;

    fs::write(destination, rendered).map_err(|e| BackupError::io(destination, e))
}

/// Byte copy that also carries over permissions plus access and
/// modification times. Read-only sources and a read-only previous copy are
/// both handled.
pub(crate) fn copy_preserving_times(source: &Path, destination: &Path) -> Result<(), BackupError> {
    // A read-only copy from an earlier run cannot be opened for writing.
    if fs::symlink_metadata(destination).is_ok_and(|meta| meta.is_file()) {
        fs::remove_file(destination).map_err(|e| BackupError::io(destination, e))?;
    }
    fs::copy(source, destination).map_err(|e| BackupError::io(destination, e))?;

    let metadata = fs::metadata(source).map_err(|e| BackupError::io(source, e))?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let file = open_for_times(destination).map_err(|e| BackupError::io(destination, e))?;
    file.set_times(times).map_err(|e| BackupError::io(destination, e))
}

// Owners may set timestamps through a read-only descriptor on Unix, so a
// destination that inherited mode 0444 still gets its times.
#[cfg(unix)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(not(unix))]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    fs::OpenOptions::new().write(true).open(path)
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), BackupError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| BackupError::io(parent, e)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::time::{Duration, SystemTime};

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, BackupConfig) {
        let dir = TempDir::new().unwrap();
        let cfg = BackupConfig::for_roots(dir.path().join("src"), dir.path().join("dst"));
        fs::create_dir_all(&cfg.source_root).unwrap();
        (dir, cfg)
    }

    fn write_source(cfg: &BackupConfig, relative: &str, contents: &str) {
        let path = cfg.source_path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn missing_source_is_reported_and_nothing_written() {
        let (_dir, cfg) = setup();
        let entry = ManifestEntry::new("openclaw.json", "config/openclaw.json");

        let outcome = backup_file(&cfg, &entry);

        assert!(matches!(outcome, StepOutcome::Missing(_)));
        assert!(!outcome.changed());
        assert!(!cfg.backup_path("config/openclaw.json").exists());
    }

    #[test]
    fn json_source_is_sanitized() {
        let (_dir, cfg) = setup();
        write_source(&cfg, "openclaw.json", r#"{"apiKey": "abc123", "name": "svc"}"#);
        let entry = ManifestEntry::new("openclaw.json", "config/openclaw.json");

        assert!(backup_file(&cfg, &entry).changed());

        let written = fs::read_to_string(cfg.backup_path("config/openclaw.json")).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, json!({"apiKey": "<$APIKEY>", "name": "svc"}));
    }

    #[test]
    fn json_output_uses_two_space_indent() {
        let (_dir, cfg) = setup();
        write_source(&cfg, "cron/jobs.json", r#"{"jobs":[{"id":"a","token":"t"}]}"#);
        let entry = ManifestEntry::new("cron/jobs.json", "cron/jobs.json");

        assert!(backup_file(&cfg, &entry).changed());

        let written = fs::read_to_string(cfg.backup_path("cron/jobs.json")).unwrap();
        let expected = "{\n  \"jobs\": [\n    {\n      \"id\": \"a\",\n      \"token\": \"<$TOKEN>\"\n    }\n  ]\n}";
        assert_eq!(written, expected);
    }

    #[test]
    fn json_numbers_keep_source_text() {
        let (_dir, cfg) = setup();
        write_source(
            &cfg,
            "openclaw.json",
            r#"{"chatId": 123456789012345678901234567890, "ratio": 0.1, "token": 7}"#,
        );
        let entry = ManifestEntry::new("openclaw.json", "config/openclaw.json");

        assert!(backup_file(&cfg, &entry).changed());

        let written = fs::read_to_string(cfg.backup_path("config/openclaw.json")).unwrap();
        assert!(written.contains("\"chatId\": 123456789012345678901234567890"), "{written}");
        assert!(written.contains("\"ratio\": 0.1"), "{written}");
        assert!(written.contains("\"token\": \"<$TOKEN>\""), "{written}");
    }

    #[test]
    fn malformed_json_fails_without_panicking() {
        let (_dir, cfg) = setup();
        write_source(&cfg, "openclaw.json", "{ not json");
        let entry = ManifestEntry::new("openclaw.json", "config/openclaw.json");

        let outcome = backup_file(&cfg, &entry);

        assert!(matches!(outcome, StepOutcome::Failed(BackupError::Parse { .. })));
        assert!(!outcome.changed());
    }

    #[test]
    fn json_overwrites_previous_backup() {
        let (_dir, cfg) = setup();
        let entry = ManifestEntry::new("openclaw.json", "config/openclaw.json");
        let dest = cfg.backup_path("config/openclaw.json");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "stale contents that are much longer than the new ones").unwrap();
        write_source(&cfg, "openclaw.json", "{}");

        assert!(backup_file(&cfg, &entry).changed());
        assert_eq!(fs::read_to_string(dest).unwrap(), "{}");
    }

    #[test]
    fn non_json_is_byte_identical_with_times() {
        let (_dir, cfg) = setup();
        let bytes: Vec<u8> = (0u8..=255).collect();
        let source = cfg.source_path("keys/id.bin");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, &bytes).unwrap();

        let past = SystemTime::now() - Duration::from_secs(86_400);
        let file = OpenOptions::new().write(true).open(&source).unwrap();
        file.set_times(FileTimes::new().set_modified(past)).unwrap();
        drop(file);

        let entry = ManifestEntry::new("keys/id.bin", "misc/id.bin");
        assert!(backup_file(&cfg, &entry).changed());

        let dest = cfg.backup_path("misc/id.bin");
        assert_eq!(fs::read(&dest).unwrap(), bytes);
        assert_eq!(
            fs::metadata(&dest).unwrap().modified().unwrap(),
            fs::metadata(&source).unwrap().modified().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn read_only_source_is_copied_on_every_run() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, cfg) = setup();
        let source = cfg.source_path("notes/readme.txt");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "first").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o444)).unwrap();
        let entry = ManifestEntry::new("notes/readme.txt", "notes/readme.txt");
        let dest = cfg.backup_path("notes/readme.txt");

        assert!(backup_file(&cfg, &entry).changed());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "first");
        assert_eq!(fs::metadata(&dest).unwrap().permissions().mode() & 0o777, 0o444);

        fs::set_permissions(&source, fs::Permissions::from_mode(0o644)).unwrap();
        fs::write(&source, "second").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o444)).unwrap();

        assert!(backup_file(&cfg, &entry).changed());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "second");
    }

    #[test]
    fn source_directory_named_like_file_fails() {
        let (_dir, cfg) = setup();
        fs::create_dir_all(cfg.source_path("openclaw.json")).unwrap();
        let entry = ManifestEntry::new("openclaw.json", "config/openclaw.json");

        let outcome = backup_file(&cfg, &entry);
        assert!(matches!(outcome, StepOutcome::Failed(BackupError::Io { .. })));
    }
}
