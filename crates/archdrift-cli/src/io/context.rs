//! Shared path/config resolution for every subcommand.
//!
//! Mirrors `original_source/backend/utils/architecture_config.py`'s
//! `_get_default_config_dir` / `services/baseline_service.py`'s
//! `default_data_dir`/`baseline_dir_for_repo`, adapted to CLI flags
//! instead of hard-coded source-relative paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archdrift_core::model::ArchitectureConfig;

use crate::args::Cli;

pub struct AppContext {
    pub repo_root: PathBuf,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub repo_id: String,
}

impl AppContext {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let repo_root = Path::new(&cli.repo)
            .canonicalize()
            .with_context(|| format!("resolving repo root {:?}", cli.repo))?;
        let config_dir = match &cli.config_dir {
            Some(dir) => PathBuf::from(dir),
            None => repo_root.join("architecture"),
        };
        let data_dir = PathBuf::from(&cli.data_dir);
        let repo_id = archdrift_store::paths::compute_repo_id(&repo_root)?;

        Ok(Self {
            repo_root,
            config_dir,
            data_dir,
            repo_id,
        })
    }

    pub fn baseline_dir(&self) -> PathBuf {
        archdrift_store::paths::baseline_dir_for_repo(&self.data_dir, &self.repo_id)
    }

    pub fn load_config(&self) -> Result<ArchitectureConfig> {
        archdrift_core::config_io::load_architecture_config(&self.config_dir)
            .with_context(|| format!("loading architecture config from {}", self.config_dir.display()))
    }
}
