// SlimDict property tests over the public API.
//
// Property 1: round trip.
//  - Model: BTreeMap with last-write-wins semantics.
//  - Invariant: every model key reads back its last value through `get`,
//    through `Index`, and through the alternate `&str` view; `len()` equals
//    the number of distinct keys.
//
// Property 2: growth never loses entries.
//  - Insert distinct keys one by one; after each insert every earlier key
//    is still present with its value, and capacity is a power of two that
//    only changes when the table was full.
use proptest::prelude::*;
use slim_dict::SlimDict;
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn prop_round_trip(pairs in proptest::collection::vec(("[a-h]{1,3}", any::<i64>()), 0..200)) {
        let mut m: SlimDict<String, i64> = SlimDict::new();
        let mut model = BTreeMap::new();
        for (k, v) in pairs {
            m.set(k.clone(), v);
            model.insert(k, v);
        }
        prop_assert_eq!(m.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
            prop_assert_eq!(&m[k], v);
        }
        let alt = m.alternate_lookup::<str>().unwrap();
        for (k, v) in &model {
            prop_assert_eq!(alt.get(k.as_str()), Some(v));
        }
    }
}

proptest! {
    #[test]
    fn prop_growth_keeps_entries(n in 1u32..300) {
        let mut m: SlimDict<u32, u32> = SlimDict::new();
        for i in 0..n {
            let before = m.capacity();
            let was_full = m.len() == before;
            m.add(i, i.wrapping_mul(31)).unwrap();
            let after = m.capacity();
            prop_assert!(after.is_power_of_two());
            if after != before {
                prop_assert!(was_full);
                prop_assert_eq!(after, if before == 0 { 4 } else { before * 2 });
            }
            prop_assert_eq!(m.len(), i as usize + 1);
        }
        for i in 0..n {
            prop_assert_eq!(m.get(&i), Some(&i.wrapping_mul(31)));
        }
    }
}
