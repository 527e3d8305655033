//! Baseline Store: normalize an edge set, compute a stable baseline
//! hash, persist it atomically alongside a summary and health report, and
//! support approval metadata and time-bound exceptions.
//!
//! Grounded on `original_source/backend/utils/baseline_store.py`:
//! `normalize_edges`, `canonical_edges_bytes`, `compute_baseline_hash_sha256`,
//! `store_baseline`, `load_baseline`, `write_baseline_meta`,
//! `write_baseline_exceptions`, `get_active_exceptions`. Field names and
//! file names below are kept identical to that module.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use archdrift_core::errors::{ArchDriftError, ArchDriftResult};
use archdrift_core::graph::GraphResult;
use archdrift_core::model::{ActiveException, Edge, EdgeSet};

use crate::atomic::{atomic_write, read_bytes, read_json};
use crate::canonical::{canonical_bytes, sha256_hex};

const EDGES_FILE: &str = "baseline_edges.json";
const SUMMARY_FILE: &str = "baseline_summary.json";
const META_FILE: &str = "baseline_meta.json";
const EXCEPTIONS_FILE: &str = "baseline_exceptions.json";

/// On-disk shape of `baseline_edges.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgesDocument {
    version: String,
    edges: Vec<Edge>,
}

/// Health stats embedded in the summary (derived from [`GraphResult`]),
/// kept out of the hashed payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineHealth {
    pub edge_count: usize,
    pub included_files: usize,
    pub unmapped_files: usize,
    pub unmapped_ratio: f64,
    pub unresolved_imports: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_unmapped_buckets: Vec<(String, usize)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<String>,
}

/// Ratio of unmapped-to-included files at or above which mapping coverage
/// is considered unhealthy.
const UNMAPPED_RATIO_GUIDANCE_THRESHOLD: f64 = 0.50;

impl BaselineHealth {
    pub fn from_graph_result(edge_count: usize, graph: &GraphResult) -> Self {
        let unmapped_ratio = if graph.included_files > 0 {
            graph.unmapped_files as f64 / graph.included_files as f64
        } else {
            0.0
        };
        let mut buckets = graph.unmapped_buckets.clone();
        buckets.truncate(10);
        let next_actions = next_actions_for(
            edge_count,
            graph.included_files,
            unmapped_ratio,
            graph.unresolved_imports,
            &buckets,
        );
        Self {
            edge_count,
            included_files: graph.included_files,
            unmapped_files: graph.unmapped_files,
            unmapped_ratio,
            unresolved_imports: graph.unresolved_imports,
            top_unmapped_buckets: buckets,
            next_actions,
        }
    }
}

/// Guidance strings a caller can surface directly, derived purely from
/// already-computed health fields. Capped at 5, matching `get_baseline_status`.
fn next_actions_for(
    edge_count: usize,
    included_files: usize,
    unmapped_ratio: f64,
    unresolved_imports: usize,
    top_unmapped_buckets: &[(String, usize)],
) -> Vec<String> {
    let mut actions = Vec::new();
    if edge_count == 0 {
        actions.push(
            "Update module_map.json to cover your real source roots (e.g., src/, packages/) and regenerate baseline."
                .to_string(),
        );
    }
    if unmapped_ratio >= UNMAPPED_RATIO_GUIDANCE_THRESHOLD {
        let bucket_labels = top_unmapped_buckets
            .iter()
            .take(3)
            .map(|(bucket, _)| bucket.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if bucket_labels.is_empty() {
            actions.push(
                "Reduce unmapped files by adding/adjusting module_map.json prefixes for the largest unmapped folders."
                    .to_string(),
            );
        } else {
            actions.push(format!(
                "Reduce unmapped files by adding/adjusting module_map.json prefixes for these buckets: {bucket_labels}."
            ));
        }
    }
    if included_files == 0 {
        actions.push(
            "No source files were included. Check scan limits / repo path / file extensions."
                .to_string(),
        );
    }
    if unresolved_imports > 0 {
        actions.push(
            "Resolve TS/JS alias imports via tsconfig paths/baseUrl or add mapping for alias roots."
                .to_string(),
        );
    }
    actions.truncate(5);
    actions
}

/// On-disk shape of `baseline_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at_utc: OffsetDateTime,
    pub baseline_hash_sha256: String,
    pub edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<BaselineHealth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineStatus {
    Draft,
    Accepted,
}

/// On-disk shape of `baseline_meta.json`, present only once a baseline
/// has been approved (or explicitly marked draft).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineMeta {
    pub version: String,
    pub status: BaselineStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none", default)]
    pub approved_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_hash_sha256: Option<String>,
}

/// Result of [`store`]: the minimal facts a caller needs after a
/// successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResult {
    pub baseline_hash_sha256: String,
    pub edge_count: usize,
}

/// Result of [`load`]: the normalized edges plus the on-disk summary.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub edges: EdgeSet,
    pub summary: BaselineSummary,
}

/// `canonical_bytes(edges)`: UTF-8 bytes of
/// `{"version":"1.0","edges":<normalized>}` with sorted keys and no
/// whitespace. The sole input to [`hash`]; health stats never touch it.
pub fn edges_canonical_bytes(edges: &EdgeSet) -> ArchDriftResult<Vec<u8>> {
    let doc = EdgesDocument {
        version: "1.0".to_string(),
        edges: edges.as_slice().to_vec(),
    };
    canonical_bytes(&doc)
}

/// `hash(edges) = SHA-256(canonical_bytes(edges))`.
pub fn hash(edges: &EdgeSet) -> ArchDriftResult<String> {
    Ok(sha256_hex(&edges_canonical_bytes(edges)?))
}

fn edges_path(dir: &Path) -> PathBuf {
    dir.join(EDGES_FILE)
}
fn summary_path(dir: &Path) -> PathBuf {
    dir.join(SUMMARY_FILE)
}
fn meta_path(dir: &Path) -> PathBuf {
    dir.join(META_FILE)
}
fn exceptions_path(dir: &Path) -> PathBuf {
    dir.join(EXCEPTIONS_FILE)
}

/// `store(dir, edges, graph_stats?)`: write `baseline_edges.json`
/// and `baseline_summary.json` atomically. `graph_stats`, when given,
/// contributes a [`BaselineHealth`] block to the summary without
/// affecting the hash.
pub fn store(
    dir: &Path,
    edges: EdgeSet,
    graph_stats: Option<&GraphResult>,
    now: OffsetDateTime,
) -> ArchDriftResult<StoreResult> {
    let hash_hex = hash(&edges)?;
    let edge_count = edges.len();

    let edges_doc = EdgesDocument {
        version: "1.0".to_string(),
        edges: edges.into_vec(),
    };
    let edges_pretty = serde_json::to_vec_pretty(&edges_doc)
        .map_err(|e| ArchDriftError::json(EDGES_FILE.to_string(), e))?;
    atomic_write(&edges_path(dir), &edges_pretty)?;

    let summary = BaselineSummary {
        version: "1.0".to_string(),
        created_at_utc: now,
        baseline_hash_sha256: hash_hex.clone(),
        edge_count,
        health: graph_stats.map(|g| BaselineHealth::from_graph_result(edge_count, g)),
    };
    let summary_pretty = serde_json::to_vec_pretty(&summary)
        .map_err(|e| ArchDriftError::json(SUMMARY_FILE.to_string(), e))?;
    atomic_write(&summary_path(dir), &summary_pretty)?;

    Ok(StoreResult {
        baseline_hash_sha256: hash_hex,
        edge_count,
    })
}

/// `generate(dir, edges, graph_stats?, now)`: [`store`] followed
/// immediately by a [`load`] of what was just written, failing loudly if
/// the reloaded hash ever disagreed with the one just computed.
/// already mandate `load(store(E)).edges == normalize(E)` as an
/// invariant; this only asserts it eagerly at generation time rather than
/// trusting it silently until the next read.
pub fn generate(
    dir: &Path,
    edges: EdgeSet,
    graph_stats: Option<&GraphResult>,
    now: OffsetDateTime,
) -> ArchDriftResult<StoreResult> {
    let result = store(dir, edges, graph_stats, now)?;
    let reloaded = load(dir)?;
    if reloaded.summary.baseline_hash_sha256 != result.baseline_hash_sha256 {
        return Err(ArchDriftError::baseline_hash_mismatch(format!(
            "reload after generate disagreed: wrote {}, reloaded {}",
            result.baseline_hash_sha256, reloaded.summary.baseline_hash_sha256
        )));
    }
    Ok(result)
}

/// `load(dir)`: read both files, schema-validate, and recompute
/// the hash and edge count from the on-disk edges. Refuses with
/// [`ArchDriftError::BaselineHashMismatch`] on any mismatch (a tamper
/// signal, not a recoverable condition).
pub fn load(dir: &Path) -> ArchDriftResult<LoadResult> {
    let edges_doc: EdgesDocument = read_json(&edges_path(dir)).map_err(|e| match e {
        ArchDriftError::Io { .. } => {
            ArchDriftError::baseline_missing(format!("missing {}", edges_path(dir).display()))
        }
        other => other,
    })?;
    if edges_doc.version != "1.0" {
        return Err(ArchDriftError::invalid_config(format!(
            "{EDGES_FILE}: unsupported version {:?}",
            edges_doc.version
        )));
    }

    let summary: BaselineSummary = read_json(&summary_path(dir)).map_err(|e| match e {
        ArchDriftError::Io { .. } => {
            ArchDriftError::baseline_missing(format!("missing {}", summary_path(dir).display()))
        }
        other => other,
    })?;
    if summary.baseline_hash_sha256.len() != 64 {
        return Err(ArchDriftError::invalid_config(format!(
            "{SUMMARY_FILE}: baseline_hash_sha256 must be 64 hex characters"
        )));
    }

    let normalized = EdgeSet::normalize(edges_doc.edges)?;
    let recomputed = hash(&normalized)?;
    if recomputed != summary.baseline_hash_sha256 {
        return Err(ArchDriftError::baseline_hash_mismatch(format!(
            "expected {}, got {}",
            summary.baseline_hash_sha256, recomputed
        )));
    }
    if normalized.len() != summary.edge_count {
        return Err(ArchDriftError::baseline_hash_mismatch(format!(
            "edge count mismatch: summary says {}, on-disk edges yield {}",
            summary.edge_count,
            normalized.len()
        )));
    }

    Ok(LoadResult {
        edges: normalized,
        summary,
    })
}

/// `true` iff a baseline (both required files) exists at `dir`.
pub fn exists(dir: &Path) -> bool {
    edges_path(dir).is_file() && summary_path(dir).is_file()
}

/// Write `baseline_meta.json` (approval state). `updated_at` is supplied
/// by the caller so persistence stays free of ambient clock reads.
pub fn write_meta(dir: &Path, meta: &BaselineMeta) -> ArchDriftResult<()> {
    let bytes = serde_json::to_vec_pretty(meta)
        .map_err(|e| ArchDriftError::json(META_FILE.to_string(), e))?;
    atomic_write(&meta_path(dir), &bytes)
}

/// Read `baseline_meta.json`, or `None` if absent or unreadable as JSON
/// (treated as "no approval recorded yet", matching the original's
/// tolerant read).
pub fn read_meta(dir: &Path) -> Option<BaselineMeta> {
    let bytes = read_bytes(&meta_path(dir)).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Validate and write `baseline_exceptions.json`. Any entry missing
/// `created_at` is stamped with `now`; `expires_at`, if present, must be
/// strictly after `created_at`.
pub fn write_exceptions(
    dir: &Path,
    exceptions: Vec<ActiveException>,
) -> ArchDriftResult<()> {
    for exc in &exceptions {
        exc.validate()?;
    }
    let bytes = serde_json::to_vec_pretty(&exceptions)
        .map_err(|e| ArchDriftError::json(EXCEPTIONS_FILE.to_string(), e))?;
    atomic_write(&exceptions_path(dir), &bytes)
}

/// Read `baseline_exceptions.json`, or an empty list if absent or not
/// valid JSON (matching the original's tolerant read).
pub fn read_exceptions(dir: &Path) -> Vec<ActiveException> {
    let Ok(bytes) = read_bytes(&exceptions_path(dir)) else {
        return Vec::new();
    };
    serde_json::from_slice(&bytes).unwrap_or_default()
}

/// `active(now)`: exceptions whose `expires_at` is absent or
/// strictly in the future relative to `now`.
pub fn active_exceptions(dir: &Path, now: OffsetDateTime) -> Vec<ActiveException> {
    read_exceptions(dir)
        .into_iter()
        .filter(|e| e.is_active(now))
        .collect()
}

/// Status snapshot used by `get_baseline_status`: whether a
/// baseline exists, its hash/edge count if so, and any recorded
/// approval metadata.
#[derive(Debug, Clone)]
pub struct BaselineStatusReport {
    pub exists: bool,
    pub summary: Option<BaselineSummary>,
    pub meta: Option<BaselineMeta>,
}

pub fn status(dir: &Path) -> ArchDriftResult<BaselineStatusReport> {
    if !exists(dir) {
        return Ok(BaselineStatusReport {
            exists: false,
            summary: None,
            meta: None,
        });
    }
    let loaded = load(dir)?;
    Ok(BaselineStatusReport {
        exists: true,
        summary: Some(loaded.summary),
        meta: read_meta(dir),
    })
}
