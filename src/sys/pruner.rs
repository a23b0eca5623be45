// src/sys/pruner.rs

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::BackupError;
use crate::sys::traits::AncestorPruner;

/// The upward walk is a two-state machine: either we are ascending at some
/// directory, or we have hit a terminal condition and stopped.
enum Ascent {
    Ascending(PathBuf),
    Stopped,
}

pub struct SystemAncestorPruner;

async fn is_empty(dir: &Path) -> Result<bool, BackupError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| BackupError::io(dir, e))?;
    let first = entries
        .next_entry()
        .await
        .map_err(|e| BackupError::io(dir, e))?;
    Ok(first.is_none())
}

#[async_trait]
impl AncestorPruner for SystemAncestorPruner {
    async fn prune_empty_ancestors(
        &self,
        removed: &Path,
        boundary: &Path,
    ) -> Result<Vec<PathBuf>, BackupError> {
        let mut pruned = Vec::new();
        let mut state = match removed.parent() {
            Some(parent) => Ascent::Ascending(parent.to_path_buf()),
            None => Ascent::Stopped,
        };

        while let Ascent::Ascending(dir) = state {
            // Terminal: reached the boundary, or stepped outside it. The
            // boundary itself is never removed, whatever its contents.
            if dir == boundary || !dir.starts_with(boundary) {
                break;
            }
            // Terminal: the directory still holds something, backup-related
            // or not. One stray file is enough to end the ascent.
            if !is_empty(&dir).await? {
                break;
            }

            fs::remove_dir(&dir)
                .await
                .map_err(|e| BackupError::io(&dir, e))?;
            pruned.push(dir.clone());

            state = match dir.parent() {
                Some(parent) => Ascent::Ascending(parent.to_path_buf()),
                // Terminal: filesystem root.
                None => Ascent::Stopped,
            };
        }

        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn prunes_empty_chain_up_to_boundary() {
        let tmp = TempDir::new().unwrap();
        let boundary = tmp.path().to_path_buf();
        let snapshot = boundary.join("2021/01/01012021-120000");
        fs::create_dir_all(&snapshot).await.unwrap();
        fs::remove_dir(&snapshot).await.unwrap();

        let pruned = SystemAncestorPruner
            .prune_empty_ancestors(&snapshot, &boundary)
            .await
            .unwrap();

        assert_eq!(pruned, vec![boundary.join("2021/01"), boundary.join("2021")]);
        assert!(!boundary.join("2021").exists());
        assert!(boundary.exists(), "the boundary itself must survive");
    }

    #[tokio::test]
    async fn stops_at_first_non_empty_ancestor() {
        let tmp = TempDir::new().unwrap();
        let boundary = tmp.path().to_path_buf();
        let snapshot = boundary.join("2021/01/01012021-120000");
        fs::create_dir_all(&snapshot).await.unwrap();
        fs::write(boundary.join("2021/README"), b"not a backup").await.unwrap();
        fs::remove_dir(&snapshot).await.unwrap();

        let pruned = SystemAncestorPruner
            .prune_empty_ancestors(&snapshot, &boundary)
            .await
            .unwrap();

        assert_eq!(pruned, vec![boundary.join("2021/01")]);
        assert!(
            boundary.join("2021/README").exists(),
            "unrelated files end the ascent untouched"
        );
    }

    #[tokio::test]
    async fn never_ascends_past_an_escaping_boundary() {
        let tmp = TempDir::new().unwrap();
        let elsewhere = tmp.path().join("unrelated-boundary");
        fs::create_dir(&elsewhere).await.unwrap();
        let snapshot = tmp.path().join("arch/2021/01/01012021-120000");
        fs::create_dir_all(&snapshot).await.unwrap();
        fs::remove_dir(&snapshot).await.unwrap();

        let pruned = SystemAncestorPruner
            .prune_empty_ancestors(&snapshot, &elsewhere)
            .await
            .unwrap();

        assert!(pruned.is_empty(), "ancestors outside the boundary are off limits");
        assert!(tmp.path().join("arch/2021/01").exists());
    }
}
