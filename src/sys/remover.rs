// src/sys/remover.rs

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::BackupError;
use crate::sys::traits::TreeRemover;

pub struct SystemTreeRemover;

#[async_trait]
impl TreeRemover for SystemTreeRemover {
    async fn remove_tree(&self, path: &Path) -> Result<(), BackupError> {
        let meta = fs::symlink_metadata(path)
            .await
            .map_err(|e| BackupError::io(path, e))?;
        if !meta.is_dir() {
            // Plain file (or symlink): a single unlink and we are done.
            return fs::remove_file(path).await.map_err(|e| BackupError::io(path, e));
        }

        // Pass 1: walk the subtree, unlinking files as they are found and
        // recording directories in discovery order (parents before children).
        // The walk starts at `path` and only ever descends, so parents and
        // siblings of `path` are out of reach.
        let mut dirs: Vec<PathBuf> = vec![path.to_path_buf()];
        let mut cursor = 0;
        while cursor < dirs.len() {
            let dir = dirs[cursor].clone();
            cursor += 1;

            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| BackupError::io(&dir, e))?;
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => return Err(BackupError::io(&dir, e)),
                };
                let child = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| BackupError::io(&child, e))?;
                if file_type.is_dir() {
                    dirs.push(child);
                } else {
                    fs::remove_file(&child)
                        .await
                        .map_err(|e| BackupError::io(&child, e))?;
                }
            }
        }

        // Pass 2: directories deepest-first, `path` itself last. Each must be
        // empty by now; a non-empty one (e.g. a concurrent writer) surfaces
        // as the OS error for that exact directory.
        for dir in dirs.iter().rev() {
            fs::remove_dir(dir)
                .await
                .map_err(|e| BackupError::io(dir, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn removes_nested_tree_and_spares_siblings() {
        let tmp = TempDir::new().unwrap();
        let doomed = tmp.path().join("snapshot");
        let sibling = tmp.path().join("sibling");

        fs::create_dir_all(doomed.join("a/b/c")).await.unwrap();
        fs::write(doomed.join("top.txt"), b"x").await.unwrap();
        fs::write(doomed.join("a/mid.txt"), b"x").await.unwrap();
        fs::write(doomed.join("a/b/c/deep.txt"), b"x").await.unwrap();
        fs::create_dir(&sibling).await.unwrap();
        fs::write(sibling.join("keep.txt"), b"x").await.unwrap();

        SystemTreeRemover.remove_tree(&doomed).await.unwrap();

        assert!(!doomed.exists(), "subtree must leave no trace");
        assert!(sibling.join("keep.txt").exists(), "siblings must survive");
        assert!(tmp.path().exists(), "parent must survive");
    }

    #[tokio::test]
    async fn removes_a_plain_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("stray");
        fs::write(&file, b"x").await.unwrap();

        SystemTreeRemover.remove_tree(&file).await.unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn vanished_path_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = SystemTreeRemover
            .remove_tree(&tmp.path().join("gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::Io { .. }));
    }
}
