use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;

use archdrift_store::baseline;
use archdrift_store::canonical::sha256_hex;
use archdrift_store::snapshot::{self, CreateSnapshotRequest, SnapshotMetadata};

use crate::args::{Cli, SnapshotAction};
use crate::io::context::AppContext;
use crate::output;

#[derive(Debug, Serialize)]
struct SnapshotOut {
    snapshot_id: String,
    repo_id: String,
    module_map_sha256: String,
    rules_hash: Option<String>,
    baseline_hash: Option<String>,
    snapshot_label: Option<String>,
    created_by: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at_utc: OffsetDateTime,
    is_new: bool,
}

impl SnapshotOut {
    fn from_created(meta: SnapshotMetadata, is_new: bool) -> Self {
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

pub async fn run(cli: &Cli, action: SnapshotAction) -> Result<()> {
    let ctx = AppContext::resolve(cli)?;
    match action {
        SnapshotAction::Create { label, by, note } => create(&ctx, label, by, note).await,
        SnapshotAction::List { limit } => list(&ctx, limit).await,
        SnapshotAction::Resolve { id } => resolve(&ctx, id).await,
    }
}

async fn create(ctx: &AppContext, label: Option<String>, by: Option<String>, note: Option<String>) -> Result<()> {
    let module_map_path = ctx.config_dir.join("module_map.json");
    let module_map_bytes = fs::read(&module_map_path)
        .with_context(|| format!("reading {}", module_map_path.display()))?;

    let rules_path = ctx.config_dir.join("allowed_rules.json");
    let rules_hash = fs::read(&rules_path).ok().map(|bytes| sha256_hex(&bytes));

    let baseline_hash = baseline::status(&ctx.baseline_dir())
        .ok()
        .and_then(|report| report.summary)
        .map(|summary| summary.baseline_hash_sha256);

    let req = CreateSnapshotRequest {
        repo_id: ctx.repo_id.clone(),
        repo_path: ctx.repo_root.display().to_string(),
        config_dir: ctx.config_dir.display().to_string(),
        module_map_bytes: &module_map_bytes,
        rules_hash,
        baseline_hash,
        snapshot_label: label,
        created_by: by,
        note,
    };

    let result = snapshot::create_snapshot(&ctx.data_dir, req, OffsetDateTime::now_utc())
        .context("creating snapshot")?;
    let meta = snapshot::resolve_snapshot(&ctx.data_dir, &ctx.repo_id, Some(&result.snapshot_id))
        .context("reading back created snapshot")?;

    let out = SnapshotOut::from_created(meta, result.is_new);
    if output::is_json() {
        output::print_json(&out)?;
    } else {
        output::print_line(&format!(
            "snapshot {} for {} ({})",
            out.snapshot_id,
            out.repo_id,
            if out.is_new { "created" } else { "already existed" }
        ));
    }
    Ok(())
}

async fn list(ctx: &AppContext, limit: usize) -> Result<()> {
    let snapshots = snapshot::list_snapshots(&ctx.data_dir, &ctx.repo_id, limit)
        .context("listing snapshots")?;

    if output::is_json() {
        output::print_json(&snapshots)?;
    } else if snapshots.is_empty() {
        output::print_line(&format!("no snapshots for {}", ctx.repo_id));
    } else {
        for meta in &snapshots {
            output::print_line(&format!("{} {}", meta.snapshot_id, meta.created_at_utc));
        }
    }
    Ok(())
}

async fn resolve(ctx: &AppContext, id: Option<String>) -> Result<()> {
    let meta = snapshot::resolve_snapshot(&ctx.data_dir, &ctx.repo_id, id.as_deref())
        .context("resolving snapshot")?;

    if output::is_json() {
        output::print_json(&meta)?;
    } else {
        output::print_line(&format!("{} {}", meta.snapshot_id, meta.created_at_utc));
    }
    Ok(())
}
