use std::path::PathBuf;

/// Shared, read-only process state: just the root under which baselines and
/// snapshots are persisted. Each request supplies its own repo path and
/// config directory; this crate never caches a repo-id-to-path mapping.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}
