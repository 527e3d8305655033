use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Common fields every request that opens a repository tree carries: where
/// it lives on disk, and where its three architecture config files live
/// (defaulting to `<repo_path>/architecture`).
#[derive(Debug, Clone, Deserialize)]
pub struct RepoLocation {
    pub repo_path: String,
    #[serde(default)]
    pub config_dir: Option<String>,
}

pub struct ResolvedRepo {
    pub repo_root: PathBuf,
    pub config_dir: PathBuf,
}

/// Canonicalize `repo_path`, verify its computed repo id matches the one
/// named in the URL, and resolve `config_dir`.
pub fn resolve(location: &RepoLocation, expected_repo_id: &str) -> Result<ResolvedRepo> {
    let repo_root = Path::new(&location.repo_path)
        .canonicalize()
        .with_context(|| format!("resolving repo_path {:?}", location.repo_path))?;

    let actual_repo_id = archdrift_store::paths::compute_repo_id(&repo_root)?;
    if actual_repo_id != expected_repo_id {
        bail!(
            "repo_path {:?} resolves to repo id {actual_repo_id}, not {expected_repo_id}",
            location.repo_path
        );
    }

    let config_dir = match &location.config_dir {
        Some(dir) => PathBuf::from(dir),
        None => repo_root.join("architecture"),
    };

    Ok(ResolvedRepo { repo_root, config_dir })
}
