use proptest::prelude::*;
use transversal::{RelationSchema, Vertical, VerticalIndex};

const COLUMNS: usize = 10;

fn schema() -> RelationSchema {
    RelationSchema::with_columns("R", (0..COLUMNS).map(|i| format!("c{}", i))).unwrap()
}

fn vertical(schema: &RelationSchema, mask: u16) -> Vertical {
    schema.vertical((0..COLUMNS).filter(|i| mask >> i & 1 == 1))
}

fn sorted(mut keys: Vec<Vertical>) -> Vec<Vertical> {
    keys.sort();
    keys
}

fn masks() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..(1 << COLUMNS), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn queries_match_a_linear_scan(keys in masks(), queries in masks(), removed in masks()) {
        let s = schema();
        let mut index = VerticalIndex::new(&s);
        let mut stored: Vec<Vertical> = Vec::new();
        for (i, mask) in keys.iter().enumerate() {
            let key = vertical(&s, *mask);
            if !stored.contains(&key) {
                stored.push(key.clone());
            }
            index.put(key, i);
        }
        for mask in &removed {
            let key = vertical(&s, *mask);
            let was_stored = stored.contains(&key);
            stored.retain(|k| *k != key);
            prop_assert_eq!(index.remove(&key).is_some(), was_stored);
        }
        prop_assert_eq!(index.len(), stored.len());
        prop_assert_eq!(sorted(index.keys().cloned().collect()), sorted(stored.clone()));

        let mut all_queries = queries.iter().map(|m| vertical(&s, *m)).collect::<Vec<_>>();
        all_queries.push(s.empty_vertical().clone());
        all_queries.push(s.full_vertical());
        for q in &all_queries {
            let subsets = stored.iter().filter(|k| k.is_subset_of(q)).cloned().collect::<Vec<_>>();
            let supersets = stored.iter().filter(|k| k.is_superset_of(q)).cloned().collect::<Vec<_>>();
            prop_assert_eq!(index.contains_subset_of(q), !subsets.is_empty());
            prop_assert_eq!(index.contains_superset_of(q), !supersets.is_empty());
            prop_assert_eq!(sorted(index.subset_keys(q)), sorted(subsets));
            prop_assert_eq!(sorted(index.superset_keys(q)), sorted(supersets));
            prop_assert_eq!(index.get(q).is_some(), stored.contains(q));
        }
    }
}
