//! Data model shared by every component.
//!
//! This module holds pure, serializable types only. Hashing and file I/O
//! live downstream in `archdrift-store`; this crate only guarantees that
//! the types here serialize to stable, sorted JSON.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::{ArchDriftError, ArchDriftResult};

/// A module identifier. Non-empty opaque string by contract; callers
/// constructing one from untrusted input should validate via
/// [`ArchitectureConfig::validate`] rather than trust the wrapper alone.
pub type ModuleId = String;

/// A directed edge between two modules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: ModuleId,
    pub to: ModuleId,
}

impl Edge {
    pub fn new(from: impl Into<ModuleId>, to: impl Into<ModuleId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A normalized, sorted, deduplicated collection of edges.
///
/// Normalization is idempotent and order-insensitive by construction: the
/// only way to build one is through [`EdgeSet::normalize`], which folds
/// duplicates and sorts lexicographically by `(from, to)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    /// Validate and normalize a raw edge collection: reject empty
    /// endpoints, dedupe, sort by `(from, to)`.
    pub fn normalize(raw: impl IntoIterator<Item = Edge>) -> ArchDriftResult<Self> {
        let mut set: BTreeSet<Edge> = BTreeSet::new();
        for edge in raw {
            if edge.from.is_empty() || edge.to.is_empty() {
                return Err(ArchDriftError::invalid_edge(
                    "edge endpoints must be non-empty module ids",
                ));
            }
            set.insert(edge);
        }
        Ok(Self {
            edges: set.into_iter().collect(),
        })
    }

    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_vec(self) -> Vec<Edge> {
        self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.binary_search(edge).is_ok()
    }

    fn set(&self) -> BTreeSet<Edge> {
        self.edges.iter().cloned().collect()
    }

    pub fn union(&self, other: &EdgeSet) -> EdgeSet {
        let merged = self.set().union(&other.set()).cloned().collect::<Vec<_>>();
        EdgeSet { edges: merged }
    }

    pub fn intersection(&self, other: &EdgeSet) -> EdgeSet {
        let merged = self
            .set()
            .intersection(&other.set())
            .cloned()
            .collect::<Vec<_>>();
        EdgeSet { edges: merged }
    }

    pub fn difference(&self, other: &EdgeSet) -> EdgeSet {
        let merged = self
            .set()
            .difference(&other.set())
            .cloned()
            .collect::<Vec<_>>();
        EdgeSet { edges: merged }
    }
}

/// A declared module: an id plus the path roots that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub roots: Vec<String>,
}

/// A declarative, config-scoped exception entry (as loaded from
/// `exceptions.json`). Distinct from [`ActiveException`], which is
/// baseline-scoped and carries timestamps rather than an optional date.
///
/// Per the accepted Open Question, these are loaded and validated but not
/// consulted by the rule checker; only baseline [`ActiveException`]
/// records participate in rule checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigException {
    pub from: ModuleId,
    pub to: ModuleId,
    pub reason: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
}

/// Read-only-after-load architecture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    pub version: String,
    pub unmapped_module_id: String,
    pub modules: Vec<Module>,
    pub deny_by_default: bool,
    pub allowed_edges: Vec<Edge>,
    pub exceptions: Vec<ConfigException>,
}

impl ArchitectureConfig {
    /// Cross-validate module ids, roots, `allowed_edges`, and
    /// `exceptions`. Skipped for edge/exception id references when
    /// `modules` is empty (bootstrapping).
    pub fn validate(&self) -> ArchDriftResult<()> {
        if self.version != "1.0" {
            return Err(ArchDriftError::invalid_config(format!(
                "unsupported architecture config version {:?}",
                self.version
            )));
        }
        if self.unmapped_module_id.is_empty() {
            return Err(ArchDriftError::invalid_config(
                "unmapped_module_id must be non-empty",
            ));
        }

        let mut seen_ids = BTreeSet::new();
        for module in &self.modules {
            if module.id.is_empty() {
                return Err(ArchDriftError::invalid_config(
                    "module id must be non-empty",
                ));
            }
            if !seen_ids.insert(module.id.as_str()) {
                return Err(ArchDriftError::invalid_config(format!(
                    "duplicate module id {:?}",
                    module.id
                )));
            }
            if module.roots.is_empty() || module.roots.iter().any(|r| r.is_empty()) {
                return Err(ArchDriftError::invalid_config(format!(
                    "module {:?} has an empty root",
                    module.id
                )));
            }
        }

        if self.modules.is_empty() {
            return Ok(());
        }

        let known = |id: &str| id == self.unmapped_module_id || seen_ids.contains(id);

        for edge in &self.allowed_edges {
            if !known(&edge.from) || !known(&edge.to) {
                return Err(ArchDriftError::invalid_config(format!(
                    "allowed_edges references unknown module id in ({:?}, {:?})",
                    edge.from, edge.to
                )));
            }
        }
        for exc in &self.exceptions {
            if !known(&exc.from) || !known(&exc.to) {
                return Err(ArchDriftError::invalid_config(format!(
                    "exceptions references unknown module id in ({:?}, {:?})",
                    exc.from, exc.to
                )));
            }
        }
        Ok(())
    }
}

/// A baseline-scoped, time-bound exception. Distinct from
/// [`ConfigException`]; only these participate in rule checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveException {
    pub from_module: ModuleId,
    pub to_module: ModuleId,
    pub owner: String,
    pub reason: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl ActiveException {
    /// An exception is active iff it has no expiry, or its expiry is
    /// strictly in the future relative to `now`.
    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        match self.expires_at {
            Some(expiry) => expiry > now,
            None => true,
        }
    }

    /// Enforced at write time: `expires_at`, if present, must be strictly
    /// after `created_at`.
    pub fn validate(&self) -> ArchDriftResult<()> {
        if self.from_module.is_empty() || self.to_module.is_empty() {
            return Err(ArchDriftError::invalid_edge(
                "exception endpoints must be non-empty module ids",
            ));
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at <= self.created_at {
                return Err(ArchDriftError::invalid_config(
                    "exception expires_at must be strictly after created_at",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_set_normalize_dedupes_and_sorts() {
        let set = EdgeSet::normalize(vec![
            Edge::new("b", "a"),
            Edge::new("a", "b"),
            Edge::new("a", "b"),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0], Edge::new("a", "b"));
        assert_eq!(set.as_slice()[1], Edge::new("b", "a"));
    }

    #[test]
    fn edge_set_rejects_empty_endpoint() {
        assert!(EdgeSet::normalize(vec![Edge::new("", "b")]).is_err());
    }

    #[test]
    fn architecture_config_rejects_unknown_module_in_allowed_edges() {
        let cfg = ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![Module {
                id: "core".into(),
                roots: vec!["core".into()],
            }],
            deny_by_default: true,
            allowed_edges: vec![Edge::new("core", "ghost")],
            exceptions: vec![],
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn architecture_config_bootstraps_with_no_modules() {
        let cfg = ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![],
            deny_by_default: false,
            allowed_edges: vec![Edge::new("anything", "goes")],
            exceptions: vec![],
        };
        cfg.validate().unwrap();
    }
}
