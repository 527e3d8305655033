use std::fs;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use archdrift_store::baseline;
use archdrift_store::canonical::sha256_hex;
use archdrift_store::snapshot::{self, CreateSnapshotRequest, SnapshotMetadata};

use crate::error::ApiResult;
use crate::repo::{self, RepoLocation};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSnapshotBody {
    #[serde(flatten)]
    pub location: RepoLocation,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
    pub repo_id: String,
    pub module_map_sha256: String,
    pub rules_hash: Option<String>,
    pub baseline_hash: Option<String>,
    pub snapshot_label: Option<String>,
    pub created_by: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at_utc: OffsetDateTime,
    pub is_new: bool,
}

impl SnapshotResponse {
    fn from_metadata(meta: SnapshotMetadata, is_new: bool) -> Self {
        Self {
            snapshot_id: meta.snapshot_id,
            repo_id: meta.repo_id,
            module_map_sha256: meta.module_map_sha256,
            rules_hash: meta.rules_hash,
            baseline_hash: meta.baseline_hash,
            snapshot_label: meta.snapshot_label,
            created_by: meta.created_by,
            created_at_utc: meta.created_at_utc,
            is_new,
        }
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<String>,
    Json(body): Json<CreateSnapshotBody>,
) -> ApiResult<Json<SnapshotResponse>> {
    let resolved = repo::resolve(&body.location, &repo_id)?;

    let module_map_path = resolved.config_dir.join("module_map.json");
    let module_map_bytes = fs::read(&module_map_path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", module_map_path.display()))?;

    let rules_path = resolved.config_dir.join("allowed_rules.json");
    let rules_hash = fs::read(&rules_path).ok().map(|bytes| sha256_hex(&bytes));

    let baseline_hash = baseline::status(&state.data_dir.join("baselines").join(&repo_id))
        .ok()
        .and_then(|report| report.summary)
        .map(|summary| summary.baseline_hash_sha256);

    let req = CreateSnapshotRequest {
        repo_id: repo_id.clone(),
        repo_path: resolved.repo_root.display().to_string(),
        config_dir: resolved.config_dir.display().to_string(),
        module_map_bytes: &module_map_bytes,
        rules_hash,
        baseline_hash,
        snapshot_label: body.label,
        created_by: body.created_by,
        note: body.note,
    };

    let result = snapshot::create_snapshot(&state.data_dir, req, OffsetDateTime::now_utc())?;
    let meta = snapshot::resolve_snapshot(&state.data_dir, &repo_id, Some(&result.snapshot_id))?;

    Ok(Json(SnapshotResponse::from_metadata(meta, result.is_new)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<SnapshotMetadata>>> {
    let snapshots = snapshot::list_snapshots(&state.data_dir, &repo_id, query.limit)?;
    Ok(Json(snapshots))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((repo_id, snapshot_id)): Path<(String, String)>,
) -> ApiResult<Json<SnapshotMetadata>> {
    let meta = snapshot::resolve_snapshot(&state.data_dir, &repo_id, Some(&snapshot_id))?;
    Ok(Json(meta))
}
