//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store laws over arbitrary keys, values and
//! operation sequences.

use proptest::prelude::*;
use std::sync::Arc;

use crate::cache::{CacheStore, ManualClock};

// == Strategies ==
fn id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,32}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,128}"
}

fn namespace_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z-]{0,15}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { keys: Vec<String> },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (id_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        id_strategy().prop_map(|key| CacheOp::Get { key }),
        prop::collection::vec(id_strategy(), 1..4).prop_map(|keys| CacheOp::Delete { keys }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits, misses and invalidations track exactly what callers observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new("prop");
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_invalidations: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(&key, &value, None),
                CacheOp::Get { key } => match store.get::<String>(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { keys } => {
                    store.delete(&keys);
                    expected_invalidations += 1;
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.invalidations, expected_invalidations);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // set then immediate get returns the stored value.
    #[test]
    fn prop_roundtrip_storage(id in id_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new("prop");
        let key = store.generate_key(&id);

        store.set(&key, &value, None);
        prop_assert_eq!(store.get::<String>(&key), Some(value));
    }

    // A key that was never set is a miss.
    #[test]
    fn prop_unset_key_is_miss(id in id_strategy()) {
        let mut store = CacheStore::new("prop");
        let key = store.generate_key(&id);
        prop_assert_eq!(store.get::<String>(&key), None);
    }

    // delete then get is a miss whatever came before.
    #[test]
    fn prop_delete_removes_entry(
        ops in prop::collection::vec(cache_op_strategy(), 0..20),
        id in id_strategy()
    ) {
        let mut store = CacheStore::new("prop");
        for op in ops {
            if let CacheOp::Set { key, value } = op {
                store.set(&key, &value, None);
            }
        }

        store.delete([id.as_str()]);
        prop_assert_eq!(store.get::<String>(&id), None);
    }

    // flush makes every key report a miss.
    #[test]
    fn prop_flush_clears_all(
        entries in prop::collection::vec((id_strategy(), value_strategy()), 1..30)
    ) {
        let mut store = CacheStore::new("prop");
        for (id, value) in &entries {
            store.set(id, value, None);
        }

        store.flush();
        for (id, _) in &entries {
            prop_assert_eq!(store.get::<String>(id), None);
        }
        prop_assert!(store.is_empty());
    }

    // Keys never collide across namespaces, and instances never share entries.
    #[test]
    fn prop_namespace_isolation(
        ns_a in namespace_strategy(),
        ns_b in namespace_strategy(),
        id in id_strategy(),
        value in value_strategy()
    ) {
        prop_assume!(ns_a != ns_b);
        let mut a = CacheStore::new(ns_a);
        let mut b = CacheStore::new(ns_b);

        let key_a = a.generate_key(&id);
        let key_b = b.generate_key(&id);
        prop_assert_ne!(&key_a, &key_b);

        a.set(&key_a, &value, None);
        prop_assert_eq!(b.get::<String>(&key_a), None);
        prop_assert_eq!(b.get::<String>(&key_b), None);
    }

    // With a capacity bound the store never grows past it.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((id_strategy(), value_strategy()), 1..200)
    ) {
        let max_entries = 50;
        let mut store = CacheStore::new("prop").with_capacity(max_entries);

        for (key, value) in entries {
            store.set(&key, &value, None);
            prop_assert!(store.len() <= max_entries);
        }
    }

    // A ttl'd entry is a miss once the clock has moved at least ttl seconds.
    #[test]
    fn prop_ttl_expiration(
        id in id_strategy(),
        value in value_strategy(),
        ttl in 1u64..120,
        extra_ms in 0u64..10_000
    ) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let mut store = CacheStore::with_clock("prop", clock.clone());

        store.set(&id, &value, Some(ttl));
        clock.advance_ms(ttl * 1000 - 1);
        prop_assert_eq!(store.get::<String>(&id), Some(value));

        clock.advance_ms(1 + extra_ms);
        prop_assert_eq!(store.get::<String>(&id), None);
    }
}
