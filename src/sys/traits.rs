use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::errors::BackupError;

// ==============================================================================
// 1. Archive Discovery (Read-Only)
// ==============================================================================

#[async_trait]
pub trait ArchiveScanner: Send + Sync {
    /// Walks every descendant of `root` (files and directories alike) and
    /// returns the paths whose full string form matches `pattern`, in no
    /// particular order. `root` itself is never a match.
    ///
    /// All-or-nothing: an unreadable `root` or a failed directory read aborts
    /// the whole scan and discards partial results.
    async fn find_matches(
        &self,
        root: &Path,
        pattern: &Regex,
    ) -> Result<Vec<PathBuf>, BackupError>;
}

// ==============================================================================
// 2. Destructive Removal (Subtree-Confined)
// ==============================================================================

#[async_trait]
pub trait TreeRemover: Send + Sync {
    /// Deletes `path` and everything beneath it, files first, directories
    /// deepest-first. Traversal never leaves the subtree rooted at `path`.
    /// A failure aborts the rest of the subtree; completed deletions stand.
    async fn remove_tree(&self, path: &Path) -> Result<(), BackupError>;
}

#[async_trait]
pub trait AncestorPruner: Send + Sync {
    /// After `removed` is gone, ascends from its immediate parent deleting
    /// each directory that is now empty. Stops at the first non-empty
    /// directory, at the filesystem root, or upon reaching `boundary`.
    /// Returns the directories actually pruned, deepest first.
    async fn prune_empty_ancestors(
        &self,
        removed: &Path,
        boundary: &Path,
    ) -> Result<Vec<PathBuf>, BackupError>;
}

// ==============================================================================
// 3. External Sync Invocation
// ==============================================================================

/// 🛡️ Discrete fields prevent shell injection: the runner builds an argv,
/// never a shell string.
#[derive(Clone, Debug)]
pub struct SyncPlan {
    pub rsync_bin: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Dated snapshot directory displaced files are archived into, if any.
    pub backup_dir: Option<PathBuf>,
    pub excludes: Vec<String>,
}

#[async_trait]
pub trait SyncRunner: Send + Sync {
    /// Invokes the external synchronization tool. `dry_run` logs the
    /// composed command and spawns nothing.
    async fn run_backup(&self, plan: &SyncPlan, dry_run: bool) -> Result<(), BackupError>;
}

// ==============================================================================
// 4. Last-Run Bookkeeping
// ==============================================================================

#[async_trait]
pub trait LastRunStore: Send + Sync {
    /// Reads the persisted timestamp. A missing or unparseable record is
    /// `None`, which callers treat as "time to run".
    async fn read_last_run(&self) -> Option<DateTime<Utc>>;

    /// Persists the moment the backup started (not when it finished).
    async fn record_run(&self, started: DateTime<Utc>) -> Result<(), BackupError>;
}
