// src/sys/retention.rs
//
// Pure retention policy: which matched archive paths get deleted. Nothing in
// this module touches the filesystem.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::errors::BackupError;

/// Builds the default snapshot filter for `root/YYYY/MM/DDMMYYYY-HHMMSS`.
///
/// Anchored at end-of-string so only the deepest (leaf) snapshot segment
/// matches; the intermediate year and month directories never make it into
/// the candidate set, which keeps retention counting unambiguous.
pub fn default_archive_pattern(root: &Path) -> Result<Regex, BackupError> {
    let root_str = root.to_string_lossy();
    let escaped = regex::escape(root_str.trim_end_matches('/'));
    let pattern = format!("{}/[0-9]{{4}}/[0-9]{{2}}/[0-9]{{8}}-[0-9]{{6}}$", escaped);
    Regex::new(&pattern)
        .map_err(|e| BackupError::Config(format!("default archive pattern invalid: {}", e)))
}

/// Compiles the caller-supplied filter, falling back to the default layout.
///
/// ⚠️ A custom pattern must keep lexicographic order chronological (the
/// default fixed-width naming does); that property is the caller's
/// responsibility and is not validated here.
pub fn compile_pattern(custom: Option<&str>, root: &Path) -> Result<Regex, BackupError> {
    match custom {
        Some(raw) => Regex::new(raw)
            .map_err(|e| BackupError::Config(format!("archive pattern '{}' invalid: {}", raw, e))),
        None => default_archive_pattern(root),
    }
}

/// Selects the candidates to delete under a "keep N most recent" policy.
///
/// Sorts ascending by path string; because snapshot names embed the date in
/// fixed-width most-significant-first order, that is oldest-first. Returns
/// the `count - keep` oldest entries (empty when `count <= keep`); the `keep`
/// newest are never returned. `keep == 0` selects everything.
pub fn select_for_removal(mut paths: Vec<PathBuf>, keep: usize) -> Vec<PathBuf> {
    paths.sort();
    let count = paths.len();
    if count <= keep {
        return Vec::new();
    }
    paths.truncate(count - keep);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshots() -> Vec<PathBuf> {
        // Deliberately unsorted on input.
        vec![
            PathBuf::from("/arch/2021/02/01022021-120000"),
            PathBuf::from("/arch/2021/01/01012021-120000"),
            PathBuf::from("/arch/2021/01/02012021-120000"),
        ]
    }

    #[test]
    fn keeps_the_newest_entries() {
        let trimmed = select_for_removal(snapshots(), 2);
        assert_eq!(trimmed, vec![PathBuf::from("/arch/2021/01/01012021-120000")]);
    }

    #[test]
    fn keep_zero_selects_everything_oldest_first() {
        let trimmed = select_for_removal(snapshots(), 0);
        assert_eq!(
            trimmed,
            vec![
                PathBuf::from("/arch/2021/01/01012021-120000"),
                PathBuf::from("/arch/2021/01/02012021-120000"),
                PathBuf::from("/arch/2021/02/01022021-120000"),
            ]
        );
    }

    #[test]
    fn selection_is_empty_when_count_fits_in_keep() {
        assert!(select_for_removal(snapshots(), 3).is_empty());
        assert!(select_for_removal(snapshots(), 10).is_empty());
        assert!(select_for_removal(Vec::new(), 0).is_empty());
    }

    #[test]
    fn selected_entries_sort_strictly_before_retained_ones() {
        for keep in 0..=4 {
            let all = {
                let mut v = snapshots();
                v.sort();
                v
            };
            let trimmed = select_for_removal(snapshots(), keep);
            assert_eq!(trimmed.len(), all.len().saturating_sub(keep));
            let retained = &all[trimmed.len()..];
            for kept in retained {
                for gone in &trimmed {
                    assert!(gone < kept);
                }
            }
        }
    }

    #[test]
    fn default_pattern_matches_only_leaf_snapshots() {
        let re = default_archive_pattern(Path::new("/arch")).unwrap();
        assert!(re.is_match("/arch/2021/01/01012021-120000"));
        assert!(!re.is_match("/arch/2021/01"), "month dir must not match");
        assert!(!re.is_match("/arch/2021"), "year dir must not match");
        assert!(
            !re.is_match("/arch/2021/01/01012021-120000/file"),
            "entries inside a snapshot must not match"
        );
        assert!(!re.is_match("/arch/2021/01/README"));
    }

    #[test]
    fn default_pattern_escapes_the_root() {
        // A root containing regex metacharacters must be taken literally.
        let re = default_archive_pattern(Path::new("/arch (main)")).unwrap();
        assert!(re.is_match("/arch (main)/2021/01/01012021-120000"));
        assert!(!re.is_match("/arch main)/2021/01/01012021-120000"));
    }

    #[test]
    fn custom_pattern_compile_failure_is_config_error() {
        let err = compile_pattern(Some("["), Path::new("/arch")).unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));
    }
}
