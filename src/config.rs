// src/config.rs

use std::env;
use std::path::PathBuf;

use crate::errors::BackupError;

/// Per-path failure policy for the trim batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnError {
    /// Record the failure and keep attempting the remaining selected paths.
    Continue,
    /// Stop deleting at the first failure; already-deleted paths stay deleted.
    Abort,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    // 📂 Mirror endpoints
    pub source: PathBuf,
    pub destination: PathBuf,

    // 📂 Archive & retention
    pub archive_root: Option<PathBuf>,
    pub entries_to_keep: usize,
    pub custom_pattern: Option<String>,
    pub prune_parents: bool,
    pub on_error: OnError,

    // ⚙️ Scheduling & invocation glue
    pub rsync_bin: PathBuf,
    pub last_run_file: Option<PathBuf>,
    pub interval_minutes: u64,
    pub excludes: Vec<String>,

    /// Audit mode: matching and selection run for real, nothing is deleted
    /// and rsync is never spawned.
    pub dry_run: bool,
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

/// Strict numeric parsing: a malformed value refuses to start the agent
/// rather than silently falling back to a default. A negative retention
/// count fails here too, since `usize` rejects the sign.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, BackupError> {
    match env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|_| {
            BackupError::Config(format!(
                "{} must be a non-negative integer, got '{}'",
                key, raw
            ))
        }),
        Err(_) => Ok(default),
    }
}

impl AgentConfig {
    /// Loads the agent configuration from `SNAPKEEP_*` environment variables.
    ///
    /// Source and destination are mandatory; everything else has a default.
    /// Validation failures are `BackupError::Config` so the caller refuses
    /// to run anything destructive on a half-read configuration.
    pub fn load() -> Result<Self, BackupError> {
        let source = env_path("SNAPKEEP_SOURCE")
            .ok_or_else(|| BackupError::Config("SNAPKEEP_SOURCE is required".into()))?;
        let destination = env_path("SNAPKEEP_DESTINATION")
            .ok_or_else(|| BackupError::Config("SNAPKEEP_DESTINATION is required".into()))?;

        let excludes = match env::var("SNAPKEEP_EXCLUDES") {
            Ok(raw) => raw
                .split(':')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        };

        let on_error = match env::var("SNAPKEEP_ON_ERROR").as_deref() {
            Ok("abort") => OnError::Abort,
            Ok("continue") | Err(_) => OnError::Continue,
            Ok(other) => {
                return Err(BackupError::Config(format!(
                    "SNAPKEEP_ON_ERROR must be 'continue' or 'abort', got '{}'",
                    other
                )));
            }
        };

        Ok(Self {
            source,
            destination,
            archive_root: env_path("SNAPKEEP_ARCHIVE_ROOT"),
            entries_to_keep: env_parse("SNAPKEEP_KEEP", 10)?,
            custom_pattern: env::var("SNAPKEEP_PATTERN").ok(),
            prune_parents: env_flag("SNAPKEEP_PRUNE_PARENTS", true),
            on_error,
            rsync_bin: env_path("SNAPKEEP_RSYNC_BIN")
                .unwrap_or_else(|| PathBuf::from("/usr/bin/rsync")),
            last_run_file: env_path("SNAPKEEP_LAST_RUN_FILE")
                .or_else(|| Some(PathBuf::from("/var/lib/snapkeep/last-run"))),
            interval_minutes: env_parse("SNAPKEEP_INTERVAL_MINUTES", 24 * 60)?,
            excludes,
            dry_run: env_flag("SNAPKEEP_DRY_RUN", false),
        })
    }
}
