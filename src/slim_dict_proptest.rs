#![cfg(test)]

// Property tests for SlimDict kept inside the crate so they can inspect the
// slot store's chains directly.

use crate::comparer::KeyComparer;
use crate::error::DictError;
use crate::slim_dict::SlimDict;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Add(usize, i32),
    TryAdd(usize, i32),
    Remove(usize),
    Get(usize),
    ContainsAlt(String),
    AltTryAdd(usize, i32),
    AltRemove(usize),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Add(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryAdd(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::ContainsAlt),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::AltTryAdd(i, v)),
            1 => idx.clone().prop_map(OpI::AltRemove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Structural checks that only the crate can make: every live entry is
// reachable exactly once, from the bucket its hash selects.
fn check_structure(sut: &SlimDict<String, i32>) -> Result<(), TestCaseError> {
    let cap = sut.capacity();
    prop_assert!(cap == 0 || cap.is_power_of_two());
    let chained = sut.store.chained_indices();
    prop_assert_eq!(chained.len(), sut.len());
    let unique: BTreeSet<usize> = chained.iter().map(|&(_, i)| i).collect();
    prop_assert_eq!(unique.len(), chained.len());
    for (bucket, i) in chained {
        let (k, _) = sut.store.entry(i);
        let hash = sut.comparer().hash(k);
        prop_assert_eq!((hash as usize) & (cap - 1), bucket);
    }
    prop_assert_eq!(sut.store.count() - sut.store.free_count(), sut.len());
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `add` rejects duplicates and leaves the old value; `try_add` never overwrites.
// - `set` overwrites; lookups return the last written value.
// - `remove` succeeds once per inserted key and misses afterwards.
// - Alternate `&str` operations agree with owned-key operations.
// - Iteration yields each live entry exactly once.
// - Chains, free list and `len` stay consistent after every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: SlimDict<String, i32> = SlimDict::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = pool[i].clone();
                    sut.set(k.clone(), v);
                    model.insert(k, v);
                }
                OpI::Add(i, v) => {
                    let k = pool[i].clone();
                    let already = model.contains_key(&k);
                    match sut.add(k.clone(), v) {
                        Ok(()) => {
                            prop_assert!(!already, "add must fail on duplicate");
                            model.insert(k, v);
                        }
                        Err(DictError::DuplicateKey) => {
                            prop_assert!(already, "duplicate error only when key exists");
                            prop_assert_eq!(sut.get(&k), model.get(&k));
                        }
                        Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                    }
                }
                OpI::TryAdd(i, v) => {
                    let k = pool[i].clone();
                    let inserted = sut.try_add(k.clone(), v);
                    prop_assert_eq!(inserted, !model.contains_key(&k));
                    model.entry(k).or_insert(v);
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.remove(k), model.remove(k));
                    prop_assert!(!sut.contains_key(k));
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k));
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
                }
                OpI::ContainsAlt(s) => {
                    let alt = sut.alternate_lookup::<str>().expect("default comparer supports str");
                    prop_assert_eq!(alt.contains_key(s.as_str()), model.contains_key(&s));
                    prop_assert_eq!(alt.get(s.as_str()), model.get(&s));
                }
                OpI::AltTryAdd(i, v) => {
                    let k = pool[i].as_str();
                    let mut alt = sut.alternate_lookup::<str>().expect("default comparer supports str");
                    let inserted = alt.try_add(k, v);
                    prop_assert_eq!(inserted, !model.contains_key(k));
                    model.entry(k.to_string()).or_insert(v);
                }
                OpI::AltRemove(i) => {
                    let k = pool[i].as_str();
                    let mut alt = sut.alternate_lookup::<str>().expect("default comparer supports str");
                    let removed = alt.remove_entry(k);
                    let expected = model.remove_entry(k);
                    prop_assert_eq!(removed, expected);
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    if let Some(v) = sut.get_mut(k) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(k) {
                        *v = v.wrapping_add(d);
                    }
                }
                OpI::Iterate => {
                    let seen: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen.len(), model.len());
                    let keys: BTreeSet<&String> = seen.iter().map(|(k, _)| k).collect();
                    prop_assert_eq!(keys.len(), seen.len());
                    for (k, v) in &seen {
                        prop_assert_eq!(model.get(k), Some(v));
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), 0);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            check_structure(&sut)?;
        }
    }
}

// Property: removing every key and inserting the same number of fresh keys
// reuses the freed slots instead of growing.
proptest! {
    #[test]
    fn prop_free_list_reuse(n in 1usize..200) {
        let mut sut: SlimDict<String, i32> = SlimDict::new();
        for i in 0..n {
            sut.set(format!("a{i}"), i as i32);
        }
        let cap = sut.capacity();
        for i in 0..n {
            prop_assert_eq!(sut.remove(&format!("a{i}")), Some(i as i32));
        }
        for i in 0..n {
            sut.set(format!("b{i}"), i as i32);
        }
        prop_assert_eq!(sut.capacity(), cap);
        prop_assert_eq!(sut.len(), n);
        prop_assert_eq!(sut.store.count(), n);
        check_structure(&sut)?;
    }
}
