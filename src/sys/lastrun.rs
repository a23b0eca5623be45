// src/sys/lastrun.rs
//
// The only persisted artifact in the whole agent: a plain-text RFC 3339
// timestamp recording when the last backup started.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;

use crate::errors::BackupError;
use crate::sys::traits::LastRunStore;

pub struct FileLastRunStore {
    /// `None` disables bookkeeping entirely; every read answers "never ran".
    path: Option<PathBuf>,
}

impl FileLastRunStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LastRunStore for FileLastRunStore {
    async fn read_last_run(&self) -> Option<DateTime<Utc>> {
        let path = self.path.as_ref()?;
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no last-run record");
                return None;
            }
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(e) => {
                // A corrupt record must never block backups; treat it as
                // "time to run" and let the next record_run overwrite it.
                tracing::warn!(path = %path.display(), error = %e, "unparseable last-run record");
                None
            }
        }
    }

    async fn record_run(&self, started: DateTime<Utc>) -> Result<(), BackupError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BackupError::io(parent, e))?;
        }
        fs::write(path, started.to_rfc3339())
            .await
            .map_err(|e| BackupError::io(path, e))
    }
}
