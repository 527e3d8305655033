use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

use archdrift_core::classify::{classify_drift, ClassificationInputs};
use archdrift_core::compare::CompareResult;
use archdrift_core::config::EngineConfig;
use archdrift_core::cycles::CycleDiff;
use archdrift_core::errors::ArchDriftError;
use archdrift_core::model::EdgeSet;
use archdrift_core::readiness::{assess_readiness, force_unknown_if_not_ready, ReadinessInputs};
use archdrift_core::rules::check_rules;
use archdrift_store::baseline;

use crate::error::{ApiError, ApiResult};
use crate::repo::{self, RepoLocation};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CommitClassification {
    pub commit: String,
    pub parent: Option<String>,
    pub classification: &'static str,
    pub reason_codes: Vec<String>,
    pub edges_added_count: usize,
    pub edges_removed_count: usize,
    pub forbidden_edges_added_count: usize,
    pub truncated: bool,
}

/// Classify a single commit against the stored baseline. Mirrors
/// `archdrift-cli`'s `analyze` command, synthesizing the compare/cycle
/// inputs from the commit delta rather than re-running a full graph
/// comparison (cycle detection is baseline-time only, so cycle counts are
/// always zero here).
pub async fn analyze_commit(
    State(state): State<Arc<AppState>>,
    Path((repo_id, sha)): Path<(String, String)>,
    Json(location): Json<RepoLocation>,
) -> ApiResult<Json<CommitClassification>> {
    let resolved = repo::resolve(&location, &repo_id)?;
    let config = archdrift_core::config_io::load_architecture_config(&resolved.config_dir)?;
    let limits = EngineConfig::default();
    let now = OffsetDateTime::now_utc();

    let dir = state.data_dir.join("baselines").join(&repo_id);
    let active_exceptions = baseline::active_exceptions(&dir, now);
    let baseline_status = baseline::status(&dir)?;
    let baseline_present = baseline_status.exists;
    let baseline_edge_count = baseline_status.summary.map(|s| s.edge_count).unwrap_or(0);

    let repo_root = resolved.repo_root.clone();
    let config_for_delta = config.clone();
    let delta_limits = limits.delta_limits;
    let sha_owned = sha.clone();
    let deadline = Duration::from_millis(limits.deadlines.analysis_ms);

    let commit_delta = tokio::time::timeout(
        deadline,
        tokio::task::spawn_blocking(move || archdrift_git::delta(&repo_root, &sha_owned, &config_for_delta, &delta_limits)),
    )
    .await
    .map_err(|_| ApiError::Core(ArchDriftError::timeout("commit analysis exceeded its deadline")))?
    .map_err(|e| ApiError::Other(anyhow::anyhow!("commit delta task panicked: {e}")))??;

    let divergence = EdgeSet::normalize(commit_delta.edges_added.iter().cloned())?;
    let absence = EdgeSet::normalize(commit_delta.edges_removed.iter().cloned())?;
    let compare = CompareResult {
        convergence: EdgeSet::normalize(vec![])?,
        convergence_count: 0,
        divergence_count: divergence.len(),
        absence_count: absence.len(),
        divergence,
        absence,
    };

    let rules = check_rules(&compare, &config, &active_exceptions, now);
    let cycles = CycleDiff {
        cycles_added: vec![],
        cycles_removed: vec![],
        cycles_added_count: 0,
        cycles_removed_count: 0,
    };

    let readiness = assess_readiness(&ReadinessInputs {
        baseline_present,
        baseline_edge_count,
        included_files: 1,
        unmapped_files: 0,
    });

    let record = match force_unknown_if_not_ready(&readiness) {
        Some(forced) => forced,
        None => classify_drift(&ClassificationInputs {
            compare: Some(&compare),
            rules: Some(&rules),
            cycles: Some(&cycles),
        }),
    };

    Ok(Json(CommitClassification {
        commit: commit_delta.commit,
        parent: commit_delta.parent,
        classification: record.classification,
        reason_codes: record.reason_codes,
        edges_added_count: record.summary.edges_added_count,
        edges_removed_count: record.summary.edges_removed_count,
        forbidden_edges_added_count: record.summary.forbidden_edges_added_count,
        truncated: commit_delta.truncated,
    }))
}
