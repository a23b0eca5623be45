// src/orchestrator.rs

use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{AgentConfig, OnError};
use crate::errors::BackupError;
use crate::sys::lastrun::FileLastRunStore;
use crate::sys::matcher::SystemArchiveScanner;
use crate::sys::pruner::SystemAncestorPruner;
use crate::sys::remover::SystemTreeRemover;
use crate::sys::retention::{compile_pattern, select_for_removal};
use crate::sys::rsync::{SystemRsyncRunner, snapshot_dir};
use crate::sys::traits::{
    AncestorPruner, ArchiveScanner, LastRunStore, SyncPlan, SyncRunner, TreeRemover,
};

/// One removal that failed, with the OS error it failed on. Collected into
/// the report instead of being swallowed.
#[derive(Debug, Serialize)]
pub struct PathFailure {
    pub path: PathBuf,
    pub error: String,
}

/// The audit artifact of one trim run. In dry-run mode `selected` is
/// computed exactly as in a real run while the destructive fields stay
/// empty and the filesystem stays untouched.
#[derive(Debug, Default, Serialize)]
pub struct TrimReport {
    pub dry_run: bool,
    pub selected: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub pruned_dirs: Vec<PathBuf>,
    pub errors: Vec<PathFailure>,
    /// True when the abort policy stopped the batch before attempting every
    /// selected path.
    pub aborted: bool,
}

pub struct BackupOrchestrator {
    config: AgentConfig,
    scanner: Box<dyn ArchiveScanner>,
    remover: Box<dyn TreeRemover>,
    pruner: Box<dyn AncestorPruner>,
    sync: Box<dyn SyncRunner>,
    last_run: Box<dyn LastRunStore>,
    /// Moment this agent decided a backup is due; persisted by `finish` so
    /// the interval is measured from start-of-run, not end.
    backup_started: DateTime<Utc>,
}

impl BackupOrchestrator {
    pub fn new(config: AgentConfig) -> Self {
        let last_run = Box::new(FileLastRunStore::new(config.last_run_file.clone()));
        Self::with_collaborators(
            config,
            Box::new(SystemArchiveScanner),
            Box::new(SystemTreeRemover),
            Box::new(SystemAncestorPruner),
            Box::new(SystemRsyncRunner),
            last_run,
        )
    }

    /// Swap-in point for alternative implementations (tests, embedding).
    pub fn with_collaborators(
        config: AgentConfig,
        scanner: Box<dyn ArchiveScanner>,
        remover: Box<dyn TreeRemover>,
        pruner: Box<dyn AncestorPruner>,
        sync: Box<dyn SyncRunner>,
        last_run: Box<dyn LastRunStore>,
    ) -> Self {
        Self {
            config,
            scanner,
            remover,
            pruner,
            sync,
            last_run,
            backup_started: Utc::now(),
        }
    }

    /// True when no readable last-run record exists or the configured
    /// interval has elapsed since it. Refreshes the captured start time
    /// whenever it answers true.
    pub async fn time_to_backup(&mut self, interval_minutes: u64) -> bool {
        let due = match self.last_run.read_last_run().await {
            None => true,
            Some(last) => last + Duration::minutes(interval_minutes as i64) < Utc::now(),
        };
        if due {
            self.backup_started = Utc::now();
        }
        due
    }

    /// Mirrors the source into the destination via the external sync tool,
    /// archiving displaced files into a freshly dated snapshot directory.
    pub async fn backup(&self) -> Result<(), BackupError> {
        let plan = SyncPlan {
            rsync_bin: self.config.rsync_bin.clone(),
            source: self.config.source.clone(),
            destination: self.config.destination.clone(),
            backup_dir: self
                .config
                .archive_root
                .as_deref()
                .map(|root| snapshot_dir(root, &Local::now())),
            excludes: self.config.excludes.clone(),
        };
        self.sync.run_backup(&plan, self.config.dry_run).await
    }

    /// Discovers dated snapshots under the archive root, keeps the newest
    /// `entries_to_keep`, removes the rest and optionally prunes emptied
    /// ancestor directories.
    ///
    /// Matching, pattern and configuration failures abort the whole
    /// operation (`Err`): there is no safe partial state to act on. Removal
    /// and pruning failures are per-path and recorded in the report; the
    /// `on_error` policy decides whether the batch continues past them.
    pub async fn trim_archives(&self) -> Result<TrimReport, BackupError> {
        let root = self.config.archive_root.as_deref().ok_or_else(|| {
            BackupError::Config("SNAPKEEP_ARCHIVE_ROOT is required for trimming".into())
        })?;
        let pattern = compile_pattern(self.config.custom_pattern.as_deref(), root)?;

        let candidates = self.scanner.find_matches(root, &pattern).await?;
        let selected = select_for_removal(candidates, self.config.entries_to_keep);

        let mut report = TrimReport {
            dry_run: self.config.dry_run,
            selected: selected.clone(),
            ..TrimReport::default()
        };
        if self.config.dry_run {
            tracing::info!(selected = report.selected.len(), "dry run: selection only");
            return Ok(report);
        }

        for path in &selected {
            match self.remover.remove_tree(path).await {
                Ok(()) => {
                    report.removed.push(path.clone());
                    if self.config.prune_parents {
                        match self.pruner.prune_empty_ancestors(path, root).await {
                            Ok(pruned) => report.pruned_dirs.extend(pruned),
                            Err(e) => {
                                tracing::warn!(path = %path.display(), error = %e, "ancestor pruning failed");
                                report.errors.push(PathFailure {
                                    path: path.clone(),
                                    error: e.to_string(),
                                });
                                if self.config.on_error == OnError::Abort {
                                    report.aborted = true;
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "snapshot removal failed");
                    report.errors.push(PathFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                    if self.config.on_error == OnError::Abort {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Persists the captured start time. Skipped in dry-run mode so an
    /// audit pass never shifts the schedule.
    pub async fn finish(&self) -> Result<(), BackupError> {
        if self.config.dry_run {
            return Ok(());
        }
        self.last_run.record_run(self.backup_started).await
    }
}
