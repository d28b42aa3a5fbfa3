use slim_dict::{CustomComparer, DictError, IgnoreAsciiCase, SlimDict};

// For every inserted key, probing with its `&str` slice matches owned indexing.
#[test]
fn str_slice_probe_equals_owned_index() {
    let mut m: SlimDict<String, usize> = SlimDict::new();
    let keys: Vec<String> = (0..100).map(|i| format!("entry-{i}")).collect();
    for (i, k) in keys.iter().enumerate() {
        m.add(k.clone(), i).unwrap();
    }
    for k in (0..100).step_by(7).map(|i| format!("entry-{i}")) {
        m.remove(&k);
    }
    let expected: Vec<(String, Option<usize>)> = keys
        .iter()
        .map(|k| (k.clone(), m.get(k).copied()))
        .collect();

    let alt = m.alternate_lookup::<str>().unwrap();
    for (k, v) in expected {
        let buf = format!("[{k}]");
        let slice = &buf[1..buf.len() - 1];
        assert_eq!(alt.get(slice).copied(), v);
        if let Some(v) = v {
            assert_eq!(alt[slice], v);
        }
    }
}

// Case-insensitive `str` probes return the stored key spelling.
#[test]
fn case_insensitive_alternate_returns_stored_key() {
    let mut m = SlimDict::with_comparer(IgnoreAsciiCase::new());
    m.set("Content-Type".to_string(), "text/plain");
    let mut alt = m.alternate_lookup::<str>().unwrap();
    let (k, v) = alt.get_key_value("content-type").unwrap();
    assert_eq!((k.as_str(), *v), ("Content-Type", "text/plain"));
    assert_eq!(
        alt.remove_entry("CONTENT-TYPE"),
        Some(("Content-Type".to_string(), "text/plain"))
    );
    assert!(alt.dict().is_empty());
}

// `Vec<u8>` keys are probed with byte slices through the default comparer.
#[test]
fn byte_slice_alternate_for_vec_keys() {
    let mut m: SlimDict<Vec<u8>, u8> = SlimDict::new();
    let mut alt = m.alternate_lookup::<[u8]>().unwrap();
    assert!(alt.try_add(b"abc", 1));
    assert!(!alt.try_add(b"abc", 2));
    assert_eq!(alt.get(b"abc"), Some(&1));
    assert_eq!(m.get(&b"abc".to_vec()), Some(&1));
}

// A custom comparer without a registered `str` alternate is rejected up front.
#[test]
fn unregistered_alternate_is_incompatible() {
    let comparer = CustomComparer::<String>::new(|k| k.len() as u64, |a, b| a == b);
    let mut m = SlimDict::with_comparer(comparer);
    m.set("k".to_string(), 1);
    let err = m.alternate_lookup::<str>().err();
    assert_eq!(err, Some(DictError::IncompatibleComparer { key_type: "str" }));
    assert_eq!(m.get(&"k".to_string()), Some(&1));
}

// A registered alternate works end to end through the view.
#[test]
fn registered_alternate_round_trip() {
    let comparer = CustomComparer::<String>::new(|k| k.len() as u64, |a, b| a == b)
        .with_alternate::<str>(|q| q.len() as u64, |q, k| q == k.as_str(), str::to_owned);
    let mut m = SlimDict::with_comparer(comparer);
    {
        let mut alt = m.alternate_lookup::<str>().unwrap();
        for w in ["one", "two", "three", "four"] {
            assert!(alt.try_add(w, w.len()));
        }
        assert_eq!(alt.remove("two"), Some(3));
        assert!(alt.contains_key("three"));
    }
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(&"four".to_string()), Some(&4));
}

fn lookup_through_shared(d: &SlimDict<String, i32>, key: &str) -> Option<i32> {
    d.alternate_lookup_ref::<str>().unwrap().get(key).copied()
}

// A `&SlimDict` is enough to probe with `&str`; unregistered alternates are
// still rejected on the shared path.
#[test]
fn shared_borrow_probes_with_str() {
    let mut m: SlimDict<String, i32> = SlimDict::new();
    m.set("one".to_string(), 1);
    m.set("two".to_string(), 2);
    assert_eq!(lookup_through_shared(&m, "two"), Some(2));
    assert_eq!(lookup_through_shared(&m, "three"), None);
    let view = m.alternate_lookup_ref::<str>().unwrap();
    assert_eq!(view["one"], 1);

    let custom = SlimDict::<String, i32, _>::with_comparer(CustomComparer::new(
        |k: &String| k.len() as u64,
        |a: &String, b: &String| a == b,
    ));
    assert!(matches!(
        custom.alternate_lookup_ref::<str>(),
        Err(DictError::IncompatibleComparer { key_type: "str" })
    ));
}
