// src/sys/rsync.rs

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::BackupError;
use crate::sys::traits::{SyncPlan, SyncRunner};

/// Dated snapshot directory for one backup run:
/// `<archive_root>/YYYY/MM/DDMMYYYY-HHMMSS`. The fixed-width segments are
/// what keeps the retention engine's lexicographic ordering chronological.
pub fn snapshot_dir(archive_root: &Path, started: &DateTime<Local>) -> PathBuf {
    archive_root
        .join(format!("{:04}", started.year()))
        .join(format!("{:02}", started.month()))
        .join(started.format("%d%m%Y-%H%M%S").to_string())
}

/// 🛡️ Argument-injection guard: rsync must never mistake our operands for
/// options. Everything user-controlled is rejected if it leads with '-'.
fn reject_option_like(what: &str, value: &str) -> Result<(), BackupError> {
    if value.starts_with('-') {
        return Err(BackupError::Config(format!(
            "suspicious {} '{}': leading '-' would be parsed as an rsync option",
            what, value
        )));
    }
    Ok(())
}

fn compose_args(plan: &SyncPlan) -> Result<Vec<String>, BackupError> {
    let source = plan.source.to_string_lossy().into_owned();
    let destination = plan.destination.to_string_lossy().into_owned();
    reject_option_like("source", &source)?;
    reject_option_like("destination", &destination)?;

    let mut args = vec!["--archive".to_string()];
    if let Some(backup_dir) = &plan.backup_dir {
        args.push("--backup".to_string());
        args.push(format!("--backup-dir={}", backup_dir.display()));
    }
    args.push("--delete".to_string());
    for exclude in &plan.excludes {
        reject_option_like("exclude", exclude)?;
        args.push(format!("--exclude={}", exclude));
    }
    args.push(source);
    args.push(destination);
    Ok(args)
}

pub struct SystemRsyncRunner;

#[async_trait]
impl SyncRunner for SystemRsyncRunner {
    async fn run_backup(&self, plan: &SyncPlan, dry_run: bool) -> Result<(), BackupError> {
        let args = compose_args(plan)?;

        if dry_run {
            tracing::info!(
                rsync = %plan.rsync_bin.display(),
                args = ?args,
                "dry run: skipping rsync invocation"
            );
            return Ok(());
        }

        let output = Command::new(&plan.rsync_bin)
            .args(&args)
            .output()
            .await
            .map_err(|e| BackupError::io(&plan.rsync_bin, e))?;

        if !output.status.success() {
            return Err(BackupError::Sync {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!(
            stdout = %String::from_utf8_lossy(&output.stdout),
            "rsync completed"
        );
        Ok(())
    }
}
