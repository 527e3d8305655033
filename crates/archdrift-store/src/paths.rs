//! Repo id / data-directory helpers.
//!
//! Grounded on `original_source/backend/services/baseline_service.py`:
//! `compute_repo_id` (resolve, POSIX-ify, SHA-256, truncate to 16 hex),
//! `default_data_dir`, `baseline_dir_for_repo`. Supplies the directory-helper
//! API shape behind the `repo_id` concept and the
//! `<data_dir>/baselines/<repo_id>/` layout, following the
//! original exactly (reject non-existent/non-directory roots, canonicalize
//! before hashing).

use std::path::{Path, PathBuf};

use archdrift_core::errors::{ArchDriftError, ArchDriftResult};

use crate::canonical::truncated_id;

/// `compute_repo_id(repo_root)`: canonicalize `repo_root`, render
/// it as a forward-slash path, and take the first 16 hex characters of
/// its SHA-256 digest. Rejects a root that does not exist or is not a
/// directory, matching the original's `ValueError`s.
pub fn compute_repo_id(repo_root: &Path) -> ArchDriftResult<String> {
    if !repo_root.exists() {
        return Err(ArchDriftError::invalid_config(format!(
            "repository root does not exist: {}",
            repo_root.display()
        )));
    }
    if !repo_root.is_dir() {
        return Err(ArchDriftError::invalid_config(format!(
            "repository root is not a directory: {}",
            repo_root.display()
        )));
    }
    let canonical = repo_root
        .canonicalize()
        .map_err(|e| ArchDriftError::io(repo_root.display().to_string(), e))?;
    let posix = canonical.to_string_lossy().replace('\\', "/");
    Ok(truncated_id(posix.as_bytes()))
}

/// Default data directory (`./data`, relative to the process current
/// directory) used when no `--data-dir` / `ARCHDRIFT_DATA_DIR` override
/// is supplied. Mirrors `default_data_dir()`'s role without hard-coding
/// a location relative to source files the way the Python original does
/// (there is no stable "backend directory" analog in a compiled binary).
pub fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// `<data_dir>/baselines/<repo_id>/`.
pub fn baseline_dir_for_repo(data_dir: &Path, repo_id: &str) -> PathBuf {
    data_dir.join("baselines").join(repo_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_repo_id_is_stable_for_the_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let a = compute_repo_id(dir.path()).unwrap();
        let b = compute_repo_id(dir.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn compute_repo_id_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(compute_repo_id(&missing).is_err());
    }

    #[test]
    fn baseline_dir_for_repo_matches_layout() {
        let data_dir = Path::new("/tmp/archdrift-data");
        let dir = baseline_dir_for_repo(data_dir, "abc123");
        assert_eq!(dir, Path::new("/tmp/archdrift-data/baselines/abc123"));
    }
}
