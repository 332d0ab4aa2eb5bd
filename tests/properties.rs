use std::collections::HashMap;

use proptest::prelude::*;

use probemap::{
    DoubleHashProber, HashTable, LinearProber, ProbeState, ProbeStrategy, StdHash, TableBuilder,
    TableError,
};

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Find(u16),
}

fn op() -> impl Strategy<Value = Op> {
    // A small key space makes overwrites, removals of live keys and reinsertion common.
    prop_oneof![
        4 => (0..64u16, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..64u16).prop_map(Op::Remove),
        1 => (0..64u16).prop_map(Op::Find),
    ]
}

/// Applies `ops` to `table` and to a std map, checking they agree after every step.
fn check_against_model<P>(
    mut table: HashTable<u16, u32, P>,
    ops: &[Op],
) -> Result<(), TestCaseError>
where
    P: ProbeStrategy<u16>,
{
    let mut model = HashMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                let len = table.len();
                let previous = table
                    .insert(k, v)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(previous, model.insert(k, v));
                if previous.is_some() {
                    prop_assert_eq!(table.len(), len);
                }
                prop_assert!(table.load_factor() < table.max_load_factor());
            }
            Op::Remove(k) => {
                let len = table.len();
                let removed = table.remove(&k);
                prop_assert_eq!(removed, model.remove(&k));
                let expected = if removed.is_some() { len - 1 } else { len };
                prop_assert_eq!(table.len(), expected);
                prop_assert_eq!(table.find(&k), None);
            }
            Op::Find(k) => {
                prop_assert_eq!(table.find(&k), model.get(&k));
                prop_assert_eq!(table.at(&k).ok(), model.get(&k));
            }
        }

        prop_assert_eq!(table.len(), model.len());
        prop_assert!(table.len() <= table.used());
        prop_assert!(table.used() <= table.capacity());
    }

    for (k, v) in &model {
        prop_assert_eq!(table.find(k), Some(v));
    }
    prop_assert_eq!(table.iter().count(), model.len());

    Ok(())
}

proptest! {
    #[test]
    fn linear_matches_model(ops in prop::collection::vec(op(), 0..400)) {
        let table = TableBuilder::new().build().unwrap();
        check_against_model::<LinearProber>(table, &ops)?;
    }

    #[test]
    fn double_hash_matches_model(ops in prop::collection::vec(op(), 0..400)) {
        let table = TableBuilder::new()
            .prober(DoubleHashProber::<StdHash>::default())
            .build()
            .unwrap();
        check_against_model(table, &ops)?;
    }

    #[test]
    fn small_ladder_matches_model(
        ops in prop::collection::vec(op(), 0..200),
        alpha in 0.3f64..=0.9,
    ) {
        let table = TableBuilder::new()
            .ladder(vec![7, 17, 37, 79, 163, 331, 673, 1361, 2729])
            .max_load_factor(alpha)
            .build()
            .unwrap();
        check_against_model::<LinearProber>(table, &ops)?;
    }

    #[test]
    fn round_trip_after_growth(keys in prop::collection::hash_set(any::<u64>(), 1..300)) {
        let mut table = HashTable::new();
        for (i, key) in keys.iter().enumerate() {
            table.insert(*key, i).unwrap();
        }

        let live = table.len();
        let index = table.capacity_index();
        table.grow().unwrap();

        prop_assert_eq!(table.len(), live);
        prop_assert_eq!(table.capacity_index(), index + 1);
        for (i, key) in keys.iter().enumerate() {
            prop_assert_eq!(table.find(key), Some(&i));
        }
    }

    #[test]
    fn probe_sequences_are_deterministic(
        start in any::<usize>(),
        rung in 0usize..28,
        key in any::<u64>(),
    ) {
        let capacity = probemap::CAPACITY_LADDER[rung].min(4096);
        let prober = DoubleHashProber::<StdHash>::default();

        let mut a = ProbeStrategy::<u64>::init(&prober, start, capacity, &key);
        let mut b = ProbeStrategy::<u64>::init(&prober, start, capacity, &key);

        let mut produced = 0;
        loop {
            let x = ProbeStrategy::<u64>::next(&prober, &mut a);
            let y = ProbeStrategy::<u64>::next(&prober, &mut b);
            prop_assert_eq!(&x, &y);
            match x {
                Ok(probemap::Probe::Slot(slot)) => {
                    prop_assert!(slot < capacity);
                    produced += 1;
                }
                Ok(probemap::Probe::Exhausted) => break,
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            }
        }

        prop_assert_eq!(produced, capacity);
        prop_assert_eq!(
            ProbeStrategy::<u64>::next(&prober, &mut a),
            Err(TableError::ProberMisuse)
        );
    }

    #[test]
    fn linear_sequence_visits_every_slot(start in any::<usize>(), capacity in 1usize..512) {
        let mut state = ProbeState::new(start, capacity, 1);
        let mut seen = vec![false; capacity];
        while let Ok(probemap::Probe::Slot(slot)) = state.advance() {
            prop_assert!(!seen[slot]);
            seen[slot] = true;
        }
        prop_assert!(seen.iter().all(|s| *s));
    }
}
