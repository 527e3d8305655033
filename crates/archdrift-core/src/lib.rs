//! archdrift-core
//!
//! Pure, deterministic logic for the ArchDrift conformance engine:
//! - path mapping
//! - import extraction for Python and TS/JS
//! - import resolution, including tsconfig/jsconfig
//! - dependency graph construction
//! - edge comparison, rule checking, cycle detection
//! - classification and readiness gating
//! - loading and merging the three on-disk architecture config files
//!
//! Two external collaborators are deliberately kept out of this crate:
//! persistence of baselines/snapshots (`archdrift-store`, which needs
//! hashing and atomic file I/O) and commit delta extraction (`archdrift-git`,
//! which needs a VCS object database). Both depend on the [`model`] types
//! defined here.

pub mod classify;
pub mod compare;
pub mod config;
pub mod config_io;
pub mod cycles;
pub mod determinism;
pub mod errors;
pub mod extract;
pub mod graph;
pub mod model;
pub mod pathmap;
pub mod readiness;
pub mod resolve;
pub mod rules;

pub use crate::errors::{ArchDriftError, ArchDriftResult};

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::classify::{classify_drift, ClassificationInputs, ClassificationRecord};
    pub use crate::compare::{compare_edges, CompareResult};
    pub use crate::config::{EngineConfig, GraphLimits};
    pub use crate::config_io::load_architecture_config;
    pub use crate::cycles::{diff_cycles, Cycle, CycleDiff, CycleResult};
    pub use crate::graph::{build_graph, GraphResult};
    pub use crate::model::{
        ActiveException, ArchitectureConfig, ConfigException, Edge, EdgeSet, Module,
    };
    pub use crate::pathmap::map_path;
    pub use crate::readiness::{assess_readiness, ReadinessReport};
    pub use crate::rules::{check_rules, RuleCheckResult};
    pub use crate::{ArchDriftError, ArchDriftResult};
}
