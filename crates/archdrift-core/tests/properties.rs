use archdrift_core::cycles::canonicalize_cycle;
use archdrift_core::model::{Edge, EdgeSet};
use proptest::prelude::*;

fn module_id() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn edge() -> impl Strategy<Value = Edge> {
    (module_id(), module_id()).prop_map(|(from, to)| Edge::new(from, to))
}

proptest! {
    #[test]
    fn normalize_is_idempotent_and_order_insensitive(mut edges in prop::collection::vec(edge(), 0..20)) {
        let once = EdgeSet::normalize(edges.clone()).unwrap();
        edges.reverse();
        edges.extend(edges.clone());
        let twice = EdgeSet::normalize(edges).unwrap();
        prop_assert_eq!(once.as_slice(), twice.as_slice());
    }

    #[test]
    fn cycle_canonicalization_is_closed_under_rotation(cycle in prop::collection::vec(module_id(), 1..6)) {
        let canonical = canonicalize_cycle(&cycle);
        for k in 0..cycle.len() {
            let mut rotated = cycle[k..].to_vec();
            rotated.extend_from_slice(&cycle[..k]);
            prop_assert_eq!(canonicalize_cycle(&rotated), canonical.clone());
        }
    }

    #[test]
    fn cycle_canonicalization_is_closed_under_reversal(cycle in prop::collection::vec(module_id(), 1..6)) {
        let canonical = canonicalize_cycle(&cycle);
        let mut reversed = cycle.clone();
        reversed.reverse();
        prop_assert_eq!(canonicalize_cycle(&reversed), canonical);
    }
}
