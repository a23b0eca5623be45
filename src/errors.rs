// src/errors.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the agent.
///
/// `Io` always names the exact path that failed, because a subtree removal
/// may have partially completed by the time it surfaces: the path tells the
/// operator where the engine stopped, and nothing already deleted is rolled
/// back.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration rejected: {0}")]
    Config(String),

    #[error("rsync failed (exit code {code}): {stderr}")]
    Sync { code: i32, stderr: String },
}

impl BackupError {
    /// Attaches the failing path to a raw OS error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
