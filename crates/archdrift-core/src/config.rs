//! Ambient, process-wide engine configuration.
//!
//! This is distinct from [`crate::model::ArchitectureConfig`], which is the
//! request-scoped module map / rules / exceptions loaded once per analysis.
//! `EngineConfig` carries the bounds every traversal needs (`max_files`,
//! `max_file_bytes`, `max_evidence`, `max_changed_files`, `max_bytes_per_file`,
//! `max_cycles`) plus the worker pool size and per-operation deadlines. The
//! crate itself never reads environment variables; callers (CLI/API) map
//! env/flags onto this struct explicitly.

use crate::errors::{ArchDriftError, ArchDriftResult};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub graph_limits: GraphLimits,
    pub delta_limits: DeltaLimits,
    pub cycle_limits: CycleLimits,
    pub deadlines: Deadlines,
    pub worker_pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            graph_limits: GraphLimits::default(),
            delta_limits: DeltaLimits::default(),
            cycle_limits: CycleLimits::default(),
            deadlines: Deadlines::default(),
            worker_pool_size: 2,
        }
    }
}

/// Bounds for the dependency graph builder.
#[derive(Debug, Clone, Copy)]
pub struct GraphLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
    pub max_evidence: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_files: 2_000,
            max_file_bytes: 200_000,
            max_evidence: 500,
        }
    }
}

/// Bounds for the commit delta extractor.
#[derive(Debug, Clone, Copy)]
pub struct DeltaLimits {
    pub max_changed_files: usize,
    pub max_bytes_per_file: usize,
}

impl Default for DeltaLimits {
    fn default() -> Self {
        Self {
            max_changed_files: 200,
            max_bytes_per_file: 200_000,
        }
    }
}

/// Bounds for the cycle engine.
#[derive(Debug, Clone, Copy)]
pub struct CycleLimits {
    pub max_cycles: usize,
}

impl Default for CycleLimits {
    fn default() -> Self {
        Self { max_cycles: 200 }
    }
}

/// Per-operation deadlines. Expressed in milliseconds so callers can
/// feed them straight into `tokio::time::timeout`.
#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
    pub baseline_build_ms: u64,
    pub analysis_ms: u64,
    pub snapshot_list_ms: u64,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            baseline_build_ms: 10 * 60 * 1000,
            analysis_ms: 5 * 60 * 1000,
            snapshot_list_ms: 30 * 1000,
        }
    }
}

/// Validate a full engine configuration.
pub fn validate_config(cfg: &EngineConfig) -> ArchDriftResult<()> {
    if cfg.graph_limits.max_files == 0 {
        return Err(ArchDriftError::invalid_config(
            "graph_limits.max_files must be greater than zero",
        ));
    }
    if cfg.graph_limits.max_file_bytes == 0 {
        return Err(ArchDriftError::invalid_config(
            "graph_limits.max_file_bytes must be greater than zero",
        ));
    }
    if cfg.delta_limits.max_changed_files == 0 {
        return Err(ArchDriftError::invalid_config(
            "delta_limits.max_changed_files must be greater than zero",
        ));
    }
    if cfg.cycle_limits.max_cycles == 0 {
        return Err(ArchDriftError::invalid_config(
            "cycle_limits.max_cycles must be greater than zero",
        ));
    }
    if cfg.worker_pool_size == 0 {
        return Err(ArchDriftError::invalid_config(
            "worker_pool_size must be greater than zero",
        ));
    }
    Ok(())
}
