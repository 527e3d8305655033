//! Atomic file persistence.
//!
//! Every writer in this crate writes to a sibling temp file in the same
//! directory, flushes and syncs it, then renames it over the target.
//! Readers therefore see either the old version of a file or the new
//! one, never a partial write — this is what lets baseline/snapshot
//! directories tolerate concurrent readers with a single writer and no
//! locking primitive.

use std::fs;
use std::io::Write;
use std::path::Path;

use archdrift_core::errors::{ArchDriftError, ArchDriftResult};

/// Write `bytes` to `path` atomically, creating parent directories as
/// needed. Uses a temp file in the same directory as `path` so the final
/// rename is same-filesystem and therefore atomic on every platform this
/// targets.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> ArchDriftResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| ArchDriftError::io(parent.display().to_string(), e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".archdrift-tmp-")
        .tempfile_in(parent)
        .map_err(|e| ArchDriftError::io(parent.display().to_string(), e))?;

    tmp.write_all(bytes)
        .map_err(|e| ArchDriftError::io(path.display().to_string(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ArchDriftError::io(path.display().to_string(), e))?;

    tmp.persist(path)
        .map_err(|e| ArchDriftError::io(path.display().to_string(), e.error))?;
    Ok(())
}

/// Read a file's bytes, naming the offending path on failure.
pub fn read_bytes(path: &Path) -> ArchDriftResult<Vec<u8>> {
    fs::read(path).map_err(|e| ArchDriftError::io(path.display().to_string(), e))
}

/// Read and parse a JSON file, naming the offending path on failure.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ArchDriftResult<T> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes).map_err(|e| ArchDriftError::json(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_parent_dirs_and_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.json");
        atomic_write(&path, b"{}").unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"{}");
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.json");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"two");
    }
}
