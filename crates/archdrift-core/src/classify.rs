//! Classifier: reduce (compare, rules, cycles) to a single
//! classification plus sorted reason codes.

use crate::compare::CompareResult;
use crate::cycles::CycleDiff;
use crate::rules::RuleCheckResult;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassificationSummary {
    pub edges_added_count: usize,
    pub edges_removed_count: usize,
    pub forbidden_edges_added_count: usize,
    pub forbidden_edges_removed_count: usize,
    pub cycles_added_count: usize,
    pub cycles_removed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub classification: &'static str,
    pub reason_codes: Vec<String>,
    pub summary: ClassificationSummary,
}

/// Borrowed view of the three upstream results; any may be absent
/// (missing-data path).
#[derive(Default)]
pub struct ClassificationInputs<'a> {
    pub compare: Option<&'a CompareResult>,
    pub rules: Option<&'a RuleCheckResult>,
    pub cycles: Option<&'a CycleDiff>,
}

/// `classify_drift({compare, rules, cycles})`.
pub fn classify_drift(inputs: &ClassificationInputs<'_>) -> ClassificationRecord {
    let mut missing_codes = Vec::new();
    if inputs.compare.is_none() {
        missing_codes.push("missing_compare".to_string());
    }
    if inputs.rules.is_none() {
        missing_codes.push("missing_rules".to_string());
    }
    if inputs.cycles.is_none() {
        missing_codes.push("missing_cycles".to_string());
    }

    if !missing_codes.is_empty() {
        missing_codes.sort();
        return ClassificationRecord {
            classification: "unknown",
            reason_codes: missing_codes,
            summary: ClassificationSummary::default(),
        };
    }

    let compare = inputs.compare.unwrap();
    let rules = inputs.rules.unwrap();
    let cycles = inputs.cycles.unwrap();

    let ea = compare.divergence_count;
    let er = compare.absence_count;
    let fa = rules.forbidden_added.len();
    let fr = rules.forbidden_removed.len();
    let ca = cycles.cycles_added_count;
    let cr = cycles.cycles_removed_count;

    let summary = ClassificationSummary {
        edges_added_count: ea,
        edges_removed_count: er,
        forbidden_edges_added_count: fa,
        forbidden_edges_removed_count: fr,
        cycles_added_count: ca,
        cycles_removed_count: cr,
    };

    if ea == 0 && er == 0 && ca == 0 && cr == 0 {
        return ClassificationRecord {
            classification: "no_change",
            reason_codes: vec![],
            summary,
        };
    }

    // Risk-first: forbidden-added or cycles-added wins any tie against
    // forbidden-removed/cycles-removed.
    if fa > 0 || ca > 0 {
        let mut codes = Vec::new();
        if fa > 0 {
            codes.push("forbidden_edges_added".to_string());
        }
        if ca > 0 {
            codes.push("cycles_added".to_string());
        }
        codes.sort();
        return ClassificationRecord {
            classification: "negative",
            reason_codes: codes,
            summary,
        };
    }

    if fr > 0 || cr > 0 {
        let mut codes = Vec::new();
        if fr > 0 {
            codes.push("forbidden_edges_removed".to_string());
        }
        if cr > 0 {
            codes.push("cycles_removed".to_string());
        }
        codes.sort();
        return ClassificationRecord {
            classification: "positive",
            reason_codes: codes,
            summary,
        };
    }

    ClassificationRecord {
        classification: "needs_review",
        reason_codes: vec!["allowed_edges_changed".to_string()],
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_edges;
    use crate::cycles::diff_cycles;
    use crate::model::{ArchitectureConfig, Edge, EdgeSet, Module};
    use crate::rules::check_rules;
    use time::OffsetDateTime;

    fn config(allowed: Vec<Edge>) -> ArchitectureConfig {
        ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![
                Module {
                    id: "ui".into(),
                    roots: vec!["ui".into()],
                },
                Module {
                    id: "core".into(),
                    roots: vec!["core".into()],
                },
            ],
            deny_by_default: true,
            allowed_edges: allowed,
            exceptions: vec![],
        }
    }

    #[test]
    fn missing_inputs_yield_unknown() {
        let inputs = ClassificationInputs::default();
        let record = classify_drift(&inputs);
        assert_eq!(record.classification, "unknown");
        assert_eq!(
            record.reason_codes,
            vec!["missing_compare", "missing_cycles", "missing_rules"]
        );
    }

    #[test]
    fn no_change_when_all_counts_zero() {
        let empty = EdgeSet::normalize(vec![]).unwrap();
        let compare = compare_edges(&empty, &empty);
        let cfg = config(vec![]);
        let rules = check_rules(&compare, &cfg, &[], OffsetDateTime::now_utc());
        let cycles = diff_cycles(&empty, &empty, 200);
        let inputs = ClassificationInputs {
            compare: Some(&compare),
            rules: Some(&rules),
            cycles: Some(&cycles),
        };
        let record = classify_drift(&inputs);
        assert_eq!(record.classification, "no_change");
        assert!(record.reason_codes.is_empty());
    }

    #[test]
    fn forbidden_edge_added_scenario_is_negative() {
        let old = EdgeSet::normalize(vec![Edge::new("core", "ui")]).unwrap();
        let new = EdgeSet::normalize(vec![Edge::new("core", "ui"), Edge::new("ui", "core")]).unwrap();
        let compare = compare_edges(&old, &new);
        let cfg = config(vec![]);
        let rules = check_rules(&compare, &cfg, &[], OffsetDateTime::now_utc());
        let cycles = diff_cycles(&old, &new, 200);
        let inputs = ClassificationInputs {
            compare: Some(&compare),
            rules: Some(&rules),
            cycles: Some(&cycles),
        };
        let record = classify_drift(&inputs);
        assert_eq!(record.classification, "negative");
        assert_eq!(record.reason_codes, vec!["forbidden_edges_added"]);
        assert_eq!(record.summary.forbidden_edges_added_count, 1);
    }

    #[test]
    fn risk_first_tie_break_prefers_negative_and_suppresses_positive_codes() {
        // One cycle removed (A,B) and a different cycle added (C,D) in the
        // same transition: cycles_added and cycles_removed are both
        // nonzero, and risk-first must still classify negative while
        // suppressing the "cycles_removed" reason code.
        let old = EdgeSet::normalize(vec![Edge::new("A", "B"), Edge::new("B", "A")]).unwrap();
        let new = EdgeSet::normalize(vec![Edge::new("C", "D"), Edge::new("D", "C")]).unwrap();
        let compare = compare_edges(&old, &new);
        let cfg = ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![],
            deny_by_default: false,
            allowed_edges: vec![],
            exceptions: vec![],
        };
        let rules = check_rules(&compare, &cfg, &[], OffsetDateTime::now_utc());
        let cycles = diff_cycles(&old, &new, 200);
        let inputs = ClassificationInputs {
            compare: Some(&compare),
            rules: Some(&rules),
            cycles: Some(&cycles),
        };
        let record = classify_drift(&inputs);
        assert_eq!(record.classification, "negative");
        assert_eq!(record.reason_codes, vec!["cycles_added"]);
        assert!(!record.reason_codes.contains(&"cycles_removed".to_string()));
    }
}
