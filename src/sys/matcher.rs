// src/sys/matcher.rs

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::BackupError;
use crate::sys::traits::ArchiveScanner;

pub struct SystemArchiveScanner;

#[async_trait]
impl ArchiveScanner for SystemArchiveScanner {
    async fn find_matches(
        &self,
        root: &Path,
        pattern: &Regex,
    ) -> Result<Vec<PathBuf>, BackupError> {
        // Fail up front instead of returning an empty match set for a
        // mistyped archive root.
        fs::metadata(root)
            .await
            .map_err(|e| BackupError::io(root, e))?;

        let mut matches = Vec::new();
        // Explicit work stack; every entry pushed here is a strict
        // descendant of `root`, so `root` itself is never tested.
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| BackupError::io(&dir, e))?;

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => return Err(BackupError::io(&dir, e)),
                };

                let path = entry.path();
                if pattern.is_match(&path.to_string_lossy()) {
                    matches.push(path.clone());
                }

                // DirEntry::file_type does not follow symlinks, so a link
                // pointing outside the archive is never descended into.
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| BackupError::io(&path, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                }
            }
        }

        Ok(matches)
    }
}
