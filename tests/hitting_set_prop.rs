use proptest::prelude::*;
use transversal::{hitting_set, RelationSchema, Vertical};

fn schema(n: usize) -> RelationSchema {
    RelationSchema::with_columns("R", (0..n).map(|i| format!("c{}", i))).unwrap()
}

fn vertical(schema: &RelationSchema, mask: u32) -> Vertical {
    schema.vertical((0..schema.num_columns()).filter(|i| mask >> i & 1 == 1))
}

/// Every column subset that hits all targets and has no hitting proper subset.
fn brute_force(schema: &RelationSchema, targets: &[Vertical]) -> Vec<Vertical> {
    let hits = |h: &Vertical| targets.iter().all(|t| h.intersects(t));
    let mut minimal = (0u32..(1 << schema.num_columns()))
        .map(|mask| vertical(schema, mask))
        .filter(|h| hits(h) && h.column_indices().all(|c| !hits(&h.without(c))))
        .collect::<Vec<_>>();
    minimal.sort();
    minimal
}

fn instance() -> impl Strategy<Value = (usize, Vec<u32>)> {
    (1usize..=7).prop_flat_map(|n| (Just(n), prop::collection::vec(1u32..(1 << n), 0..10)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn family_is_the_set_of_minimal_transversals((n, masks) in instance()) {
        let s = schema(n);
        let targets = masks.iter().map(|m| vertical(&s, *m)).collect::<Vec<_>>();
        let family = hitting_set(&s, targets.clone(), None);

        for (i, h) in family.iter().enumerate() {
            // hitting
            for t in &targets {
                prop_assert!(h.intersects(t), "{} misses {}", h, t);
            }
            // antichain
            for g in &family[i + 1..] {
                prop_assert!(!h.is_subset_of(g) && !g.is_subset_of(h), "{} and {} are nested", h, g);
            }
            // minimality
            for c in h.column_indices() {
                let smaller = h.without(c);
                prop_assert!(targets.iter().any(|t| !smaller.intersects(t)), "{} is not minimal", h);
            }
        }
        prop_assert_eq!(family, brute_force(&s, &targets));
    }

    #[test]
    fn pruned_family_is_an_antichain_of_allowed_sets((n, masks) in instance(), banned in 0usize..7) {
        let s = schema(n);
        let targets = masks.iter().map(|m| vertical(&s, *m)).collect::<Vec<_>>();
        let mut reject = |v: &Vertical| v.contains(banned);
        let family = hitting_set(&s, targets.clone(), Some(&mut reject));

        for (i, h) in family.iter().enumerate() {
            prop_assert!(!h.contains(banned));
            for g in &family[i + 1..] {
                prop_assert!(!h.is_subset_of(g) && !g.is_subset_of(h));
            }
        }
        // every unpruned transversal avoiding the banned column survives pruning
        let unpruned = hitting_set(&s, targets.clone(), None);
        for h in unpruned.iter().filter(|h| !h.contains(banned)) {
            prop_assert!(family.contains(h), "{} was lost", h);
        }
    }

    #[test]
    fn target_order_does_not_change_the_family((n, masks) in instance()) {
        let s = schema(n);
        let targets = masks.iter().map(|m| vertical(&s, *m)).collect::<Vec<_>>();
        let mut reversed = targets.clone();
        reversed.reverse();
        prop_assert_eq!(hitting_set(&s, targets, None), hitting_set(&s, reversed, None));
    }
}
