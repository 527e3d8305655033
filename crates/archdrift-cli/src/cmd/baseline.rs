use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use time::OffsetDateTime;

use archdrift_core::config::EngineConfig;
use archdrift_store::baseline::{self, BaselineMeta, BaselineStatus};

use crate::args::{BaselineAction, Cli};
use crate::io::context::AppContext;
use crate::output;

#[derive(Debug, Serialize)]
struct GenerateOut {
    repo_id: String,
    baseline_hash_sha256: String,
    edge_count: usize,
    included_files: usize,
    unmapped_files: usize,
    unresolved_imports: usize,
}

#[derive(Debug, Serialize)]
struct StatusOut {
    repo_id: String,
    exists: bool,
    baseline_hash_sha256: Option<String>,
    edge_count: Option<usize>,
    approval_status: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApproveOut {
    repo_id: String,
    status: String,
    approved_by: String,
    baseline_hash_sha256: Option<String>,
}

pub async fn run(cli: &Cli, action: BaselineAction) -> Result<()> {
    let ctx = AppContext::resolve(cli)?;
    match action {
        BaselineAction::Generate => generate(&ctx).await,
        BaselineAction::Status => status(&ctx).await,
        BaselineAction::Approve { by, note } => approve(&ctx, &by, note.as_deref()).await,
    }
}

async fn generate(ctx: &AppContext) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    pb.set_message("loading architecture config");
    let config = ctx.load_config()?;
    let limits = EngineConfig::default();
    let repo_root = ctx.repo_root.clone();
    let config_for_graph = config.clone();

    pb.set_message("walking repository tree");
    let graph = tokio::task::spawn_blocking(move || {
        archdrift_core::graph::build_graph(&repo_root, &config_for_graph, &limits.graph_limits)
    })
    .await
    .context("graph build task panicked")??;

    pb.set_message("writing baseline");
    let dir = ctx.baseline_dir();
    let result = baseline::generate(&dir, graph.edges.clone(), Some(&graph), OffsetDateTime::now_utc())
        .with_context(|| format!("generating baseline at {}", dir.display()))?;

    pb.finish_and_clear();

    let out = GenerateOut {
        repo_id: ctx.repo_id.clone(),
        baseline_hash_sha256: result.baseline_hash_sha256,
        edge_count: result.edge_count,
        included_files: graph.included_files,
        unmapped_files: graph.unmapped_files,
        unresolved_imports: graph.unresolved_imports,
    };

    if output::is_json() {
        output::print_json(&out)?;
    } else {
        output::print_line(&format!(
            "baseline generated for {}: {} edges ({} included files, {} unmapped, {} unresolved imports), hash {}",
            out.repo_id, out.edge_count, out.included_files, out.unmapped_files, out.unresolved_imports, out.baseline_hash_sha256
        ));
    }
    Ok(())
}

async fn status(ctx: &AppContext) -> Result<()> {
    let dir = ctx.baseline_dir();
    let report = baseline::status(&dir).with_context(|| format!("reading baseline status at {}", dir.display()))?;

    let out = StatusOut {
        repo_id: ctx.repo_id.clone(),
        exists: report.exists,
        baseline_hash_sha256: report.summary.as_ref().map(|s| s.baseline_hash_sha256.clone()),
        edge_count: report.summary.as_ref().map(|s| s.edge_count),
        approval_status: report.meta.as_ref().map(|m| format!("{:?}", m.status).to_lowercase()),
    };

    if output::is_json() {
        output::print_json(&out)?;
    } else if out.exists {
        output::print_line(&format!(
            "baseline for {} exists: {} edges, hash {}, approval: {}",
            out.repo_id,
            out.edge_count.unwrap_or(0),
            out.baseline_hash_sha256.as_deref().unwrap_or("?"),
            out.approval_status.as_deref().unwrap_or("draft")
        ));
    } else {
        output::print_line(&format!("no baseline for {}", out.repo_id));
    }
    Ok(())
}

async fn approve(ctx: &AppContext, by: &str, note: Option<&str>) -> Result<()> {
    let dir = ctx.baseline_dir();
    let loaded = baseline::load(&dir).with_context(|| format!("loading baseline at {}", dir.display()))?;

    let now = OffsetDateTime::now_utc();
    let meta = BaselineMeta {
        version: "1.0".to_string(),
        status: BaselineStatus::Accepted,
        updated_at: now,
        approved_by: Some(by.to_string()),
        approved_at: Some(now),
        approval_note: note.map(|n| n.to_string()),
        baseline_hash_sha256: Some(loaded.summary.baseline_hash_sha256.clone()),
    };
    baseline::write_meta(&dir, &meta).with_context(|| format!("writing baseline approval at {}", dir.display()))?;

    let out = ApproveOut {
        repo_id: ctx.repo_id.clone(),
        status: "accepted".to_string(),
        approved_by: by.to_string(),
        baseline_hash_sha256: Some(loaded.summary.baseline_hash_sha256),
    };

    if output::is_json() {
        output::print_json(&out)?;
    } else {
        output::print_line(&format!("baseline for {} approved by {}", out.repo_id, out.approved_by));
    }
    Ok(())
}
