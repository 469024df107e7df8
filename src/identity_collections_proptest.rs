#![cfg(test)]

// Property tests for IdentitySet/IdentityMap kept inside the crate so they
// can check BucketTable's internal consistency after every operation.

use crate::hash::{hash, IdentityHash};
use crate::heap::{Heap, ObjectRef};
use crate::identity_map::IdentityMap;
use crate::identity_set::IdentitySet;
use crate::value::Value;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// Descriptor for a pool value. `Object(n)` with the same `n` names the same
// reference; different `n` are distinct references.
#[derive(Clone, Debug)]
enum Seed {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Object(u8),
}

fn arb_seed() -> impl Strategy<Value = Seed> {
    prop_oneof![
        Just(Seed::Undefined),
        Just(Seed::Null),
        any::<bool>().prop_map(Seed::Bool),
        prop_oneof![
            (-3i32..3).prop_map(|n| f64::from(n)),
            Just(-0.0),
            Just(f64::NAN),
            Just(1.23e45),
            Just(0.5),
        ]
        .prop_map(Seed::Number),
        "[a-c]{0,3}".prop_map(Seed::Text),
        (0u8..4).prop_map(Seed::Object),
    ]
}

fn materialize(seeds: &[Seed]) -> Vec<Value> {
    let mut heap = Heap::new();
    let objects: Vec<ObjectRef> = (0..4).map(|_| heap.array(Vec::<Value>::new())).collect();
    seeds
        .iter()
        .map(|s| match s {
            Seed::Undefined => Value::Undefined,
            Seed::Null => Value::Null,
            Seed::Bool(b) => Value::from(*b),
            Seed::Number(n) => Value::from(*n),
            Seed::Text(t) => Value::from(t.as_str()),
            Seed::Object(i) => Value::from(objects[usize::from(*i)]),
        })
        .collect()
}

#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Has(usize),
    Get(usize),
    Remove(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Seed>, Vec<Op>)> {
    proptest::collection::vec(arb_seed(), 1..=10).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Add(i, v)),
            idx.clone().prop_map(Op::Has),
            idx.clone().prop_map(Op::Get),
            idx.prop_map(Op::Remove),
            Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Value wrapper squeezing every hash into three buckets.
#[derive(Clone, Debug)]
struct Crowded(Value);

impl IdentityHash for Crowded {
    fn identity_hash(&self) -> u32 {
        hash(&self.0) % 3
    }
    fn is_identical(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
    }
}

// Reference model: association list searched linearly by identity.
struct Model<K> {
    entries: Vec<(K, i32)>,
}

impl<K: IdentityHash> Model<K> {
    fn position(&self, k: &K) -> Option<usize> {
        self.entries.iter().position(|(m, _)| m.is_identical(k))
    }
}

fn run_set<K, F>(pool: &[Value], ops: &[Op], wrap: F) -> Result<(), TestCaseError>
where
    K: IdentityHash + Clone,
    F: Fn(&Value) -> K,
{
    let mut sut: IdentitySet<K> = IdentitySet::new();
    let mut model: Model<K> = Model { entries: Vec::new() };

    for op in ops {
        match *op {
            Op::Add(i, _) => {
                let k = wrap(&pool[i]);
                let fresh = model.position(&k).is_none();
                prop_assert_eq!(sut.add(k.clone()), fresh, "add reports whether it changed the set");
                if fresh {
                    model.entries.push((k, 0));
                }
            }
            Op::Has(i) | Op::Get(i) => {
                let k = wrap(&pool[i]);
                prop_assert_eq!(sut.has(&k), model.position(&k).is_some());
            }
            Op::Remove(i) => {
                let k = wrap(&pool[i]);
                let pos = model.position(&k);
                prop_assert_eq!(sut.remove(&k), pos.is_some());
                if let Some(p) = pos {
                    model.entries.swap_remove(p);
                }
            }
            Op::Iterate => {
                let mut visited = 0;
                let mut all_known = true;
                sut.for_each(|m| {
                    visited += 1;
                    // NaN-like members are never identical, even to themselves.
                    all_known &= !m.is_identical(m) || model.position(m).is_some();
                });
                prop_assert_eq!(visited, model.entries.len());
                prop_assert!(all_known);
            }
        }
        prop_assert_eq!(sut.size(), model.entries.len());
        prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
        sut.assert_consistent();
    }
    Ok(())
}

fn run_map<K, F>(pool: &[Value], ops: &[Op], wrap: F) -> Result<(), TestCaseError>
where
    K: IdentityHash + Clone,
    F: Fn(&Value) -> K,
{
    let mut sut: IdentityMap<K, i32> = IdentityMap::new();
    let mut model: Model<K> = Model { entries: Vec::new() };

    for op in ops {
        match *op {
            Op::Add(i, v) => {
                let k = wrap(&pool[i]);
                let expected = match model.position(&k) {
                    Some(p) => Some(core::mem::replace(&mut model.entries[p].1, v)),
                    None => {
                        model.entries.push((k.clone(), v));
                        None
                    }
                };
                prop_assert_eq!(sut.set(k, v), expected, "set returns the previous value");
            }
            Op::Has(i) => {
                let k = wrap(&pool[i]);
                prop_assert_eq!(sut.has(&k), model.position(&k).is_some());
            }
            Op::Get(i) => {
                let k = wrap(&pool[i]);
                let expected = model.position(&k).map(|p| model.entries[p].1);
                prop_assert_eq!(sut.get(&k).copied(), expected);
                prop_assert_eq!(*sut.get_or(&k, &i32::MIN), expected.unwrap_or(i32::MIN));
            }
            Op::Remove(i) => {
                let k = wrap(&pool[i]);
                let expected = model.position(&k).map(|p| model.entries.swap_remove(p).1);
                prop_assert_eq!(sut.remove(&k), expected);
                prop_assert!(!sut.has(&k), "removed key is gone");
            }
            Op::Iterate => {
                let mut visited = 0;
                let mut matches = true;
                sut.for_each(|k, v| {
                    visited += 1;
                    matches &= !k.is_identical(k)
                        || model
                            .position(k)
                            .map_or(false, |p| model.entries[p].1 == *v);
                });
                prop_assert_eq!(visited, model.entries.len());
                prop_assert!(matches, "for_each pairs agree with the model");
            }
        }
        prop_assert_eq!(sut.size(), model.entries.len());
        sut.assert_consistent();
    }
    Ok(())
}

// Property: IdentitySet agrees with a linear identity model across random
// operation sequences.
// - `add` is true exactly when no identical member exists.
// - `remove` is true exactly when one did; size tracks live members.
// - `for_each` visits each live member once.
// - Buckets never hold duplicates or stray empties.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_set_state_machine((seeds, ops) in arb_scenario()) {
        let pool = materialize(&seeds);
        run_set(&pool, &ops, Value::clone)?;
    }

    #[test]
    fn prop_set_state_machine_with_collisions((seeds, ops) in arb_scenario()) {
        let pool = materialize(&seeds);
        run_set(&pool, &ops, |v| Crowded(v.clone()))?;
    }
}

// Property: IdentityMap agrees with the model.
// - `set` always returns the previous value (or nothing for a new key).
// - `get`/`get_or`/`has`/`remove` honour identity, including for
//   undefined, null, NaN and object keys.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_map_state_machine((seeds, ops) in arb_scenario()) {
        let pool = materialize(&seeds);
        run_map(&pool, &ops, Value::clone)?;
    }

    #[test]
    fn prop_map_state_machine_with_collisions((seeds, ops) in arb_scenario()) {
        let pool = materialize(&seeds);
        run_map(&pool, &ops, |v| Crowded(v.clone()))?;
    }
}

// Property: string hashes are in range, never zero, and deterministic.
proptest! {
    #[test]
    fn prop_string_hash_in_range(s in ".{0,40}") {
        let h = hash(&Value::from(s.as_str()));
        prop_assert!(h >= 1);
        prop_assert_eq!(h, h & crate::hash::HASH_MASK);
        prop_assert_eq!(h, hash(&Value::from(s)));
    }

    #[test]
    fn prop_number_hash_in_range(n in any::<f64>()) {
        let h = hash(&Value::from(n));
        prop_assert_eq!(h, h & crate::hash::HASH_MASK);
        prop_assert_eq!(h, hash(&Value::from(n)));
    }
}
