// Backup configuration.
//
// Defaults mirror the fixed layout:
//   source: `~/.openclaw/`
//   backup: `~/openclaw-config-backup/`
// `BackupConfig::load_from` reads a TOML file; missing fields keep defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SOURCE_DIR_NAME: &str = ".openclaw";
const BACKUP_DIR_NAME: &str = "openclaw-config-backup";

/// Markers flagging a JSON key as secret. Matched case-insensitively as substrings.
pub const DEFAULT_SENSITIVE_KEYS: [&str; 5] = ["apiKey", "token", "auth", "password", "secret"];

/// Default source root: `~/.openclaw/`.
pub fn default_source_root() -> PathBuf {
    home().join(SOURCE_DIR_NAME)
}

/// Default backup root: `~/openclaw-config-backup/`.
pub fn default_backup_root() -> PathBuf {
    home().join(BACKUP_DIR_NAME)
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Manifest ───────────────────────────────────────────────────────

/// One file copied per run: source-relative path to backup-relative path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub source: String,
    pub destination: String,
}

impl ManifestEntry {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self { source: source.into(), destination: destination.into() }
    }

    /// JSON sources are sanitized; everything else is byte-copied.
    pub fn is_json(&self) -> bool {
        self.source.ends_with(".json")
    }
}

fn default_manifest() -> Vec<ManifestEntry> {
    vec![
        ManifestEntry::new("openclaw.json", "config/openclaw.json"),
        ManifestEntry::new("cron/jobs.json", "cron/jobs.json"),
    ]
}

// ── Sensitive keys ─────────────────────────────────────────────────

/// Case-insensitive substring markers. Stored lowercased.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SensitiveKeys {
    markers: Vec<String>,
}

impl SensitiveKeys {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut markers: Vec<String> = markers
            .into_iter()
            .map(|marker| marker.as_ref().to_lowercase())
            .filter(|marker| !marker.is_empty())
            .collect();
        markers.sort();
        markers.dedup();
        Self { markers }
    }

    /// True when the case-folded key contains any marker.
    pub fn matches(&self, key: &str) -> bool {
        let folded = key.to_lowercase();
        self.markers.iter().any(|marker| folded.contains(marker.as_str()))
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for SensitiveKeys {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_KEYS)
    }
}

impl From<Vec<String>> for SensitiveKeys {
    fn from(markers: Vec<String>) -> Self {
        Self::new(markers)
    }
}

impl From<SensitiveKeys> for Vec<String> {
    fn from(keys: SensitiveKeys) -> Self {
        keys.markers
    }
}

// ── Backup config ──────────────────────────────────────────────────

/// Everything a backup run needs. Built once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory holding the live configuration files.
    pub source_root: PathBuf,
    /// Git working tree receiving the copies.
    pub backup_root: PathBuf,
    /// Log file name, relative to `backup_root`.
    pub log_file_name: String,
    /// Logger name written on every log line.
    pub logger_name: String,
    /// Workspace directory name, same under both roots.
    pub workspace_dir: String,
    /// Directory name skipped at any depth when mirroring the workspace.
    pub vcs_marker: String,
    pub sensitive_keys: SensitiveKeys,
    /// Processed in order.
    pub manifest: Vec<ManifestEntry>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self::for_roots(default_source_root(), default_backup_root())
    }
}

impl BackupConfig {
    /// Default layout under arbitrary roots.
    pub fn for_roots(source_root: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            backup_root: backup_root.into(),
            log_file_name: "backup.log".into(),
            logger_name: "openclaw_backup".into(),
            workspace_dir: "workspace".into(),
            vcs_marker: ".git".into(),
            sensitive_keys: SensitiveKeys::default(),
            manifest: default_manifest(),
        }
    }

    /// Load overrides from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    pub fn log_path(&self) -> PathBuf {
        self.backup_root.join(&self.log_file_name)
    }

    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source_root.join(relative)
    }

    pub fn backup_path(&self, relative: &str) -> PathBuf {
        self.backup_root.join(relative)
    }

    pub fn workspace_source(&self) -> PathBuf {
        self.source_root.join(&self.workspace_dir)
    }

    pub fn workspace_backup(&self) -> PathBuf {
        self.backup_root.join(&self.workspace_dir)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
