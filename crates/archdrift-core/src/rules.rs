//! Rule Checker: intersect added edges with allowed-edge policy and
//! active exceptions.

use time::OffsetDateTime;

use crate::compare::CompareResult;
use crate::model::{ActiveException, ArchitectureConfig, Edge, EdgeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub violation_type: &'static str,
    pub edge: Edge,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCheckResult {
    pub forbidden_added: EdgeSet,
    pub allowed_via_exception: EdgeSet,
    /// Always empty: the system has no concept of required edges.
    pub forbidden_removed: EdgeSet,
    pub violations: Vec<Violation>,
    pub ok: bool,
}

/// `check_rules(compare, config, active_exceptions)`.
///
/// Per the accepted Open Question, `allowed_edges` dominates: an edge
/// present in both `allowed_edges` and the exception list is never
/// forbidden and never surfaced via `allowed_via_exception`. Only
/// baseline-scoped [`ActiveException`] records (not `config.exceptions`)
/// participate here, per the other accepted Open Question.
pub fn check_rules(
    compare: &CompareResult,
    config: &ArchitectureConfig,
    active_exceptions: &[ActiveException],
    now: OffsetDateTime,
) -> RuleCheckResult {
    let permissive = !config.deny_by_default && config.allowed_edges.is_empty();

    let empty = EdgeSet::normalize(vec![]).unwrap();
    if permissive {
        return RuleCheckResult {
            forbidden_added: empty.clone(),
            allowed_via_exception: empty.clone(),
            forbidden_removed: empty,
            violations: vec![],
            ok: true,
        };
    }

    let allowed = EdgeSet::normalize(config.allowed_edges.iter().cloned()).unwrap_or(empty.clone());
    let forbidden_raw = compare.divergence.difference(&allowed);

    let exception_edges: Vec<Edge> = active_exceptions
        .iter()
        .filter(|exc| exc.validate().is_ok() && exc.is_active(now))
        .map(|exc| Edge::new(exc.from_module.clone(), exc.to_module.clone()))
        .collect();
    let exceptions = EdgeSet::normalize(exception_edges).unwrap_or(empty.clone());

    let allowed_via_exception = forbidden_raw.intersection(&exceptions);
    let forbidden_added = forbidden_raw.difference(&exceptions);

    let violations = forbidden_added
        .as_slice()
        .iter()
        .map(|edge| Violation {
            violation_type: "forbidden_added",
            edge: edge.clone(),
            reason: format!(
                "edge ({}, {}) is not in allowed_edges and not covered by an active exception",
                edge.from, edge.to
            ),
        })
        .collect::<Vec<_>>();

    let ok = forbidden_added.is_empty();

    RuleCheckResult {
        forbidden_added,
        allowed_via_exception,
        forbidden_removed: empty,
        violations,
        ok,
    }
}
