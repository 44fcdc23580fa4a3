//! Model-based tests for the hash table and its storage primitives.

use proptest::prelude::*;
use serde_dt::{
    GrowableBuffer, HashTable, KeyHasher, KeyPolicy, Seed, StringArena, TableKey, TextKey,
};
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, u32),
    Remove(u8),
    Get(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    // A small key pool keeps removals and replacements frequent.
    prop_oneof![
        3 => (0u8..48, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0u8..48).prop_map(Op::Remove),
        1 => (0u8..48).prop_map(Op::Get),
    ]
}

fn text_key(k: u8) -> String {
    format!("key-{k}")
}

fn assert_counts<K: TableKey, V, H: KeyHasher>(table: &HashTable<K, V, H>) {
    assert!(table.used_count() + table.tombstone_count() < table.slot_count());
    assert_eq!(table.used_count(), table.len());
}

/// Sends every key to the same start slot.
struct Collide;

impl KeyHasher for Collide {
    fn hash_str(&self, _key: &str, _seed: u64) -> u64 {
        7
    }

    fn hash_bytes(&self, _key: &[u8], _seed: u64) -> u64 {
        7
    }
}

proptest! {
    #[test]
    fn prop_text_table_matches_hashmap(
        ops in prop::collection::vec(arb_op(), 0..400),
        policy in prop_oneof![
            Just(KeyPolicy::Shared),
            Just(KeyPolicy::Duplicate),
            Just(KeyPolicy::Intern),
        ],
    ) {
        let mut table: HashTable<TextKey, u32> = HashTable::with_policy(policy);
        let mut model: HashMap<String, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let key = text_key(k);
                    let previous = table.insert(key.as_str().into(), v).unwrap();
                    prop_assert_eq!(previous, model.insert(key, v));
                }
                Op::Remove(k) => {
                    let key = text_key(k);
                    prop_assert_eq!(table.remove(&key), model.remove(&key));
                }
                Op::Get(k) => {
                    let key = text_key(k);
                    prop_assert_eq!(table.get(&key), model.get(&key));
                }
            }
            assert_counts(&table);
        }

        prop_assert_eq!(table.len(), model.len());
        for (key, value) in table.iter() {
            prop_assert_eq!(model.get(key), Some(value));
        }
    }

    #[test]
    fn prop_byte_keys_match_hashmap(ops in prop::collection::vec(arb_op(), 0..400)) {
        let mut wide: HashTable<[u8; 8], u32> = HashTable::new();
        let mut narrow: HashTable<[u8; 3], u32> = HashTable::new();
        let mut model: HashMap<u8, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let expected = model.insert(k, v);
                    prop_assert_eq!(wide.insert(u64::from(k).to_le_bytes(), v).unwrap(), expected);
                    prop_assert_eq!(narrow.insert([k, 0, k], v).unwrap(), expected);
                }
                Op::Remove(k) => {
                    let expected = model.remove(&k);
                    prop_assert_eq!(wide.remove(&u64::from(k).to_le_bytes()), expected);
                    prop_assert_eq!(narrow.remove(&[k, 0, k]), expected);
                }
                Op::Get(k) => {
                    prop_assert_eq!(wide.get(&u64::from(k).to_le_bytes()), model.get(&k));
                    prop_assert_eq!(narrow.get(&[k, 0, k]), model.get(&k));
                }
            }
            assert_counts(&wide);
            assert_counts(&narrow);
        }
    }

    #[test]
    fn prop_colliding_keys_stay_reachable(count in 1usize..120) {
        let mut table: HashTable<TextKey, usize, Collide> =
            HashTable::with_hasher(KeyPolicy::Duplicate, Seed::default(), Collide);
        for i in 0..count {
            table.insert(format!("c{i}").as_str().into(), i).unwrap();
            assert_counts(&table);
        }
        for i in (0..count).step_by(2) {
            let key = format!("c{i}");
            prop_assert!(table.delete(key.as_str()));
            assert_counts(&table);
        }
        for i in 0..count {
            let expected = if i % 2 == 0 { None } else { Some(&i) };
            prop_assert_eq!(table.get(format!("c{i}").as_str()), expected);
        }
    }

    #[test]
    fn prop_buffer_reallocations_are_logarithmic(n in 1usize..5000) {
        let mut buf = GrowableBuffer::new();
        for i in 0..n {
            buf.push(i).unwrap();
        }
        let floor_log2 = (usize::BITS - 1 - n.leading_zeros()) as usize;
        prop_assert!(buf.reallocations() <= floor_log2 + 1);
        prop_assert!(buf.capacity() >= n);
        prop_assert_eq!(buf.len(), n);
    }
}

#[test]
fn test_tombstone_reused_in_full_bucket() {
    let mut table: HashTable<TextKey, usize, Collide> =
        HashTable::with_hasher(KeyPolicy::Duplicate, Seed::default(), Collide);
    for i in 0..9 {
        table.insert(format!("k{i}").as_str().into(), i).unwrap();
    }
    assert_eq!(table.slot_count(), 16);

    assert_eq!(table.remove("k0"), Some(0));
    table.insert("fresh".into(), 100).unwrap();

    assert_eq!(table.slot_count(), 16);
    assert_eq!(table.tombstone_count(), 0);
    assert_eq!(table.get("fresh"), Some(&100));
    assert_eq!(table.get("k8"), Some(&8));
}

#[test]
fn test_arena_block_schedule() {
    let mut arena = StringArena::new();
    let word = "x".repeat(200);
    let handles: Vec<_> = (0..15).map(|_| arena.intern(&word).unwrap()).collect();

    assert_eq!(arena.block_sizes(), vec![512, 512, 1024, 1024, 2048]);
    assert!(handles.iter().all(|&h| arena.get(h) == word));
}

#[test]
fn test_arena_oversized_string_gets_dedicated_block() {
    let mut arena = StringArena::new();
    let small = arena.intern("small").unwrap();
    let big = "y".repeat(4000);
    let handle = arena.intern(&big).unwrap();
    let after = arena.intern("after").unwrap();

    assert_eq!(arena.block_sizes(), vec![512, 4001]);
    assert_eq!(arena.get(handle), big);
    assert_eq!(arena.get(small), "small");
    assert_eq!(arena.get(after), "after");
}
