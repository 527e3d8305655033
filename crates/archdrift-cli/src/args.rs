use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "archdrift", version, about = "ArchDrift conformance engine CLI")]
pub struct Cli {
    /// Emit JSON output on stdout instead of a human-readable summary.
    #[arg(long, global = true)]
    pub json: bool,

    /// Repository root to analyze.
    #[arg(long, global = true, default_value = ".")]
    pub repo: String,

    /// Directory holding module_map.json / allowed_rules.json / exceptions.json.
    /// Defaults to `<repo>/architecture`.
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Directory under which baselines and snapshots are persisted.
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Baseline operations: generate, status, approve.
    Baseline {
        #[command(subcommand)]
        action: BaselineAction,
    },

    /// Classify one or more commits against the stored baseline.
    Analyze {
        /// Commit SHAs to analyze, newest-first.
        sha: Vec<String>,
    },

    /// Content-addressed architecture-configuration snapshots.
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Environment and configuration sanity checks.
    Doctor,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BaselineAction {
    /// Build the dependency graph for the working tree and store it as
    /// the new baseline.
    Generate,
    /// Report whether a baseline exists, its hash/edge count, and any
    /// recorded approval.
    Status,
    /// Record approval metadata for the current baseline.
    Approve {
        #[arg(long)]
        by: String,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SnapshotAction {
    /// Create (or return the existing) snapshot for the current
    /// module_map.json / allowed_rules.json / baseline hash.
    Create {
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// List snapshots for the repository, newest first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Resolve a snapshot by id, or the newest one if no id is given.
    Resolve {
        #[arg(long)]
        id: Option<String>,
    },
}
