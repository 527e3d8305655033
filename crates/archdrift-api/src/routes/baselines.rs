use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use archdrift_core::config::EngineConfig;
use archdrift_core::errors::ArchDriftError;
use archdrift_store::baseline::{self, BaselineMeta, BaselineStatus};

use crate::error::{ApiError, ApiResult};
use crate::repo::{self, RepoLocation};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub repo_id: String,
    pub baseline_hash_sha256: String,
    pub edge_count: usize,
    pub included_files: usize,
    pub unmapped_files: usize,
    pub unresolved_imports: usize,
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<String>,
    Json(location): Json<RepoLocation>,
) -> ApiResult<Json<GenerateResponse>> {
    let resolved = repo::resolve(&location, &repo_id)?;
    let limits = EngineConfig::default();
    let dir = state.data_dir.join("baselines").join(&repo_id);

    let deadline = Duration::from_millis(limits.deadlines.baseline_build_ms);
    let config = archdrift_core::config_io::load_architecture_config(&resolved.config_dir)?;

    let graph = tokio::time::timeout(
        deadline,
        tokio::task::spawn_blocking(move || {
            archdrift_core::graph::build_graph(&resolved.repo_root, &config, &limits.graph_limits)
        }),
    )
    .await
    .map_err(|_| ApiError::Core(ArchDriftError::timeout("baseline generation exceeded its deadline")))?
    .map_err(|e| ApiError::Other(anyhow::anyhow!("baseline generation task panicked: {e}")))??;

    let result = baseline::generate(&dir, graph.edges.clone(), Some(&graph), OffsetDateTime::now_utc())?;

    Ok(Json(GenerateResponse {
        repo_id,
        baseline_hash_sha256: result.baseline_hash_sha256,
        edge_count: result.edge_count,
        included_files: graph.included_files,
        unmapped_files: graph.unmapped_files,
        unresolved_imports: graph.unresolved_imports,
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub repo_id: String,
    pub exists: bool,
    pub baseline_hash_sha256: Option<String>,
    pub edge_count: Option<usize>,
    pub approval_status: Option<String>,
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let dir = state.data_dir.join("baselines").join(&repo_id);
    let report = baseline::status(&dir)?;

    Ok(Json(StatusResponse {
        repo_id,
        exists: report.exists,
        baseline_hash_sha256: report.summary.as_ref().map(|s| s.baseline_hash_sha256.clone()),
        edge_count: report.summary.as_ref().map(|s| s.edge_count),
        approval_status: report.meta.as_ref().map(|m| format!("{:?}", m.status).to_lowercase()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub approved_by: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub repo_id: String,
    pub status: String,
    pub approved_by: String,
    pub baseline_hash_sha256: Option<String>,
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<String>,
    Json(body): Json<ApproveRequest>,
) -> ApiResult<Json<ApproveResponse>> {
    let dir = state.data_dir.join("baselines").join(&repo_id);
    let loaded = baseline::load(&dir)?;

    let now = OffsetDateTime::now_utc();
    let meta = BaselineMeta {
        version: "1.0".to_string(),
        status: BaselineStatus::Accepted,
        updated_at: now,
        approved_by: Some(body.approved_by.clone()),
        approved_at: Some(now),
        approval_note: body.note,
        baseline_hash_sha256: Some(loaded.summary.baseline_hash_sha256.clone()),
    };
    baseline::write_meta(&dir, &meta)?;

    Ok(Json(ApproveResponse {
        repo_id,
        status: "accepted".to_string(),
        approved_by: body.approved_by,
        baseline_hash_sha256: Some(loaded.summary.baseline_hash_sha256),
    }))
}
