//! Snapshot Registry: a content-addressed registry of architecture
//! configurations (module map + rules hash + optional baseline hash)
//! under a stable repo id.
//!
//! Grounded on `original_source/backend/services/baseline_service.py`
//! (`compute_repo_id` — canonical resolved POSIX path, SHA-256, truncate)
//! and `original_source/backend/tests/test_onboarding_arch_snapshot_*.py`
//! (metadata field names, idempotent-create semantics, descending sort by
//! `created_at_utc` with empty timestamps sorting last).
//!
//! Directory layout: `<data_dir>/snapshots/<repo_id>/<snapshot_id>/`
//! holding `module_map.json` (the caller's bytes, copied verbatim) and
//! `metadata.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use archdrift_core::errors::{ArchDriftError, ArchDriftResult};

use crate::atomic::{atomic_write, read_bytes, read_json};
use crate::canonical::{sha256_hex, truncated_id};

const MODULE_MAP_FILE: &str = "module_map.json";
const METADATA_FILE: &str = "metadata.json";

/// `repo_id = SHA-256(canonical(repo_root).as_posix())[:16]`.
/// Callers are expected to have already canonicalized `repo_root`
/// (resolved symlinks, absolute); this function only hashes the string
/// it is given, matching the original's "resolved POSIX path" input.
pub fn compute_repo_id(canonical_repo_path_posix: &str) -> String {
    truncated_id(canonical_repo_path_posix.as_bytes())
}

/// `snapshot_id = SHA-256(module_map_sha256 || "|" || rules_hash? || "|" || baseline_hash?)[:16]`.
pub fn compute_snapshot_id(
    module_map_sha256: &str,
    rules_hash: Option<&str>,
    baseline_hash: Option<&str>,
) -> String {
    let input = format!(
        "{}|{}|{}",
        module_map_sha256,
        rules_hash.unwrap_or(""),
        baseline_hash.unwrap_or("")
    );
    truncated_id(input.as_bytes())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub snapshot_id: String,
    pub repo_id: String,
    pub repo_path: String,
    pub config_dir: String,
    pub module_map_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at_utc: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateSnapshotRequest<'a> {
    pub repo_id: String,
    pub repo_path: String,
    pub config_dir: String,
    pub module_map_bytes: &'a [u8],
    pub rules_hash: Option<String>,
    pub baseline_hash: Option<String>,
    pub snapshot_label: Option<String>,
    pub created_by: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSnapshotResult {
    pub snapshot_id: String,
    pub snapshot_dir: PathBuf,
    pub module_map_sha256: String,
    pub created_at_utc: OffsetDateTime,
    pub is_new: bool,
}

fn snapshots_root(data_dir: &Path, repo_id: &str) -> PathBuf {
    data_dir.join("snapshots").join(repo_id)
}

fn snapshot_dir(data_dir: &Path, repo_id: &str, snapshot_id: &str) -> PathBuf {
    snapshots_root(data_dir, repo_id).join(snapshot_id)
}

/// `create(repo, config_dir, label?, by?, note?)`: idempotent.
/// If a snapshot directory already exists with both required files,
/// returns its existing `created_at_utc` and `is_new=false`; otherwise
/// atomically writes both files and returns `is_new=true`.
pub fn create_snapshot(
    data_dir: &Path,
    req: CreateSnapshotRequest,
    now: OffsetDateTime,
) -> ArchDriftResult<CreateSnapshotResult> {
    let module_map_sha256 = sha256_hex(req.module_map_bytes);
    let snapshot_id = compute_snapshot_id(
        &module_map_sha256,
        req.rules_hash.as_deref(),
        req.baseline_hash.as_deref(),
    );
    let dir = snapshot_dir(data_dir, &req.repo_id, &snapshot_id);
    let module_map_path = dir.join(MODULE_MAP_FILE);
    let metadata_path = dir.join(METADATA_FILE);

    if module_map_path.is_file() && metadata_path.is_file() {
        let existing: SnapshotMetadata = read_json(&metadata_path)?;
        return Ok(CreateSnapshotResult {
            snapshot_id,
            snapshot_dir: dir,
            module_map_sha256,
            created_at_utc: existing.created_at_utc,
            is_new: false,
        });
    }

    atomic_write(&module_map_path, req.module_map_bytes)?;

    let metadata = SnapshotMetadata {
        snapshot_id: snapshot_id.clone(),
        repo_id: req.repo_id,
        repo_path: req.repo_path,
        config_dir: req.config_dir,
        module_map_sha256: module_map_sha256.clone(),
        rules_hash: req.rules_hash,
        baseline_hash: req.baseline_hash,
        snapshot_label: req.snapshot_label,
        created_by: req.created_by,
        note: req.note,
        created_at_utc: now,
    };
    let bytes = serde_json::to_vec_pretty(&metadata)
        .map_err(|e| ArchDriftError::json(METADATA_FILE.to_string(), e))?;
    atomic_write(&metadata_path, &bytes)?;

    Ok(CreateSnapshotResult {
        snapshot_id,
        snapshot_dir: dir,
        module_map_sha256,
        created_at_utc: now,
        is_new: true,
    })
}

/// `list(repo, limit)`: scan `snapshots/<repo_id>/`, read each
/// `metadata.json`, sort descending by `created_at_utc` (entries with no
/// readable timestamp sort last), clip to `limit` clamped to `[1, 100]`.
pub fn list_snapshots(
    data_dir: &Path,
    repo_id: &str,
    limit: usize,
) -> ArchDriftResult<Vec<SnapshotMetadata>> {
    let root = snapshots_root(data_dir, repo_id);
    let mut entries: Vec<SnapshotMetadata> = Vec::new();

    if root.is_dir() {
        let read_dir = fs::read_dir(&root).map_err(|e| ArchDriftError::io(root.display().to_string(), e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| ArchDriftError::io(root.display().to_string(), e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let metadata_path = entry.path().join(METADATA_FILE);
            if !metadata_path.is_file() {
                continue;
            }
            if let Ok(bytes) = read_bytes(&metadata_path) {
                if let Ok(meta) = serde_json::from_slice::<SnapshotMetadata>(&bytes) {
                    entries.push(meta);
                }
            }
        }
    }

    entries.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));
    let clamped = limit.clamp(1, 100);
    entries.truncate(clamped);
    Ok(entries)
}

/// `resolve(repo, snapshot_id?)`: exact lookup if `snapshot_id`
/// is given (validated against `^[a-f0-9]{16}$`); else the newest by
/// `created_at_utc`. [`ArchDriftError::SnapshotNotFound`] if nothing
/// matches.
pub fn resolve_snapshot(
    data_dir: &Path,
    repo_id: &str,
    snapshot_id: Option<&str>,
) -> ArchDriftResult<SnapshotMetadata> {
    if let Some(id) = snapshot_id {
        if !is_valid_snapshot_id(id) {
            return Err(ArchDriftError::invalid_config(format!(
                "snapshot id {id:?} is not 16 lowercase hex characters"
            )));
        }
        let metadata_path = snapshot_dir(data_dir, repo_id, id).join(METADATA_FILE);
        return read_json(&metadata_path).map_err(|_| {
            ArchDriftError::snapshot_not_found(format!("no snapshot {id} for repo {repo_id}"))
        });
    }

    list_snapshots(data_dir, repo_id, 1)?
        .into_iter()
        .next()
        .ok_or_else(|| ArchDriftError::snapshot_not_found(format!("no snapshots for repo {repo_id}")))
}

fn is_valid_snapshot_id(id: &str) -> bool {
    id.len() == 16 && id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}
