//! Cycle Engine: enumerate canonicalized simple cycles with a hard
//! upper bound, and diff cycle sets between two graphs.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Edge, EdgeSet, ModuleId};

/// A canonicalized simple cycle: a sequence of module ids, rotated so
/// the lexicographically smallest vertex is first, with the
/// lexicographically smaller of the forward/reverse rotation kept.
pub type Cycle = Vec<ModuleId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    pub cycles: Vec<Cycle>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDiff {
    pub cycles_added: Vec<Cycle>,
    pub cycles_removed: Vec<Cycle>,
    pub cycles_added_count: usize,
    pub cycles_removed_count: usize,
}

fn adjacency(edges: &EdgeSet) -> BTreeMap<ModuleId, Vec<ModuleId>> {
    let mut adj: BTreeMap<ModuleId, Vec<ModuleId>> = BTreeMap::new();
    for edge in edges.as_slice() {
        adj.entry(edge.from.clone()).or_default().push(edge.to.clone());
        adj.entry(edge.to.clone()).or_default();
    }
    for succs in adj.values_mut() {
        succs.sort();
        succs.dedup();
    }
    adj
}

/// Rotate `cycle` so its lexicographically smallest element is first,
/// then keep whichever of that rotation and the reversed rotation is
/// lexicographically smaller.
pub fn canonicalize_cycle(cycle: &[ModuleId]) -> Cycle {
    if cycle.is_empty() {
        return vec![];
    }
    let n = cycle.len();
    let (min_idx, _) = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .unwrap();

    let forward: Cycle = (0..n).map(|i| cycle[(min_idx + i) % n].clone()).collect();

    let reversed_cycle: Vec<ModuleId> = cycle.iter().rev().cloned().collect();
    let (rev_min_idx, _) = reversed_cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .unwrap();
    let reverse: Cycle = (0..n)
        .map(|i| reversed_cycle[(rev_min_idx + i) % n].clone())
        .collect();

    if reverse < forward {
        reverse
    } else {
        forward
    }
}

/// `detect(edges, max_cycles)`: DFS from each vertex in sorted
/// order, carrying the current path stack and a global fully-explored
/// set. Re-entering a vertex on the current path emits the cycle slice
/// from first occurrence to end of path. Halts once `max_cycles` unique
/// canonical cycles have been found.
pub fn detect(edges: &EdgeSet, max_cycles: usize) -> CycleResult {
    let adj = adjacency(edges);
    let mut seen_canonical: BTreeSet<Cycle> = BTreeSet::new();
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut fully_explored: BTreeSet<ModuleId> = BTreeSet::new();
    let mut truncated = false;

    let vertices: Vec<ModuleId> = adj.keys().cloned().collect();

    'outer: for start in &vertices {
        if fully_explored.contains(start) {
            continue;
        }
        let mut stack: Vec<ModuleId> = vec![start.clone()];
        let mut on_stack_pos: BTreeMap<ModuleId, usize> = BTreeMap::new();
        on_stack_pos.insert(start.clone(), 0);
        let mut iter_stack: Vec<std::slice::Iter<ModuleId>> =
            vec![adj.get(start).map(|v| v.as_slice()).unwrap_or(&[]).iter()];

        while let Some(top_iter) = iter_stack.last_mut() {
            match top_iter.next() {
                Some(next) => {
                    if let Some(&pos) = on_stack_pos.get(next) {
                        let cycle_slice = stack[pos..].to_vec();
                        let canonical = canonicalize_cycle(&cycle_slice);
                        if seen_canonical.insert(canonical.clone()) {
                            cycles.push(canonical);
                            if cycles.len() >= max_cycles {
                                truncated = true;
                                break 'outer;
                            }
                        }
                        continue;
                    }
                    if fully_explored.contains(next) {
                        continue;
                    }
                    stack.push(next.clone());
                    on_stack_pos.insert(next.clone(), stack.len() - 1);
                    iter_stack.push(adj.get(next).map(|v| v.as_slice()).unwrap_or(&[]).iter());
                }
                None => {
                    iter_stack.pop();
                    if let Some(finished) = stack.pop() {
                        on_stack_pos.remove(&finished);
                        fully_explored.insert(finished);
                    }
                }
            }
        }
        if truncated {
            break;
        }
    }

    cycles.sort();
    CycleResult { cycles, truncated }
}

/// `diff(old_edges, new_edges)`: detect on each, set-difference
/// canonical cycles.
pub fn diff_cycles(old: &EdgeSet, new: &EdgeSet, max_cycles: usize) -> CycleDiff {
    let old_cycles: BTreeSet<Cycle> = detect(old, max_cycles).cycles.into_iter().collect();
    let new_cycles: BTreeSet<Cycle> = detect(new, max_cycles).cycles.into_iter().collect();

    let cycles_added: Vec<Cycle> = new_cycles.difference(&old_cycles).cloned().collect();
    let cycles_removed: Vec<Cycle> = old_cycles.difference(&new_cycles).cloned().collect();

    CycleDiff {
        cycles_added_count: cycles_added.len(),
        cycles_removed_count: cycles_removed.len(),
        cycles_added,
        cycles_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> EdgeSet {
        EdgeSet::normalize(pairs.iter().map(|(f, t)| Edge::new(*f, *t))).unwrap()
    }

    #[test]
    fn self_loop_yields_single_vertex_cycle() {
        let e = edges(&[("A", "A")]);
        let result = detect(&e, 200);
        assert_eq!(result.cycles, vec![vec!["A".to_string()]]);
        assert!(!result.truncated);
    }

    #[test]
    fn two_cycle_is_detected() {
        let e = edges(&[("A", "B"), ("B", "A")]);
        let result = detect(&e, 200);
        assert_eq!(result.cycles.len(), 1);
    }

    #[test]
    fn canonicalization_is_closed_under_rotation_and_reversal() {
        let c1 = vec!["B".to_string(), "C".to_string(), "A".to_string()];
        let c2 = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let c3 = vec!["C".to_string(), "B".to_string(), "A".to_string()];
        assert_eq!(canonicalize_cycle(&c1), canonicalize_cycle(&c2));
        assert_eq!(canonicalize_cycle(&c2), canonicalize_cycle(&c3));
    }

    #[test]
    fn max_cycles_bound_is_respected() {
        // A complete-ish graph with many 2-cycles to exceed a tiny bound.
        let pairs: Vec<(&str, &str)> = vec![
            ("A", "B"),
            ("B", "A"),
            ("B", "C"),
            ("C", "B"),
            ("C", "D"),
            ("D", "C"),
        ];
        let e = edges(&pairs);
        let result = detect(&e, 2);
        assert_eq!(result.cycles.len(), 2);
        assert!(result.truncated);
    }

    #[test]
    fn diff_reports_added_cycle() {
        let old = edges(&[("A", "B")]);
        let new = edges(&[("A", "B"), ("B", "A")]);
        let diff = diff_cycles(&old, &new, 200);
        assert_eq!(diff.cycles_added_count, 1);
        assert_eq!(diff.cycles_removed_count, 0);
    }
}
