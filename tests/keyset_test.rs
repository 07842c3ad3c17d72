// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

mod common;

use common::{random_dag, rng};
use orbit_census::{FlatKeySet, PackedKey, ShardedKeySet};
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

fn keys(count: usize, seed: u64) -> Vec<PackedKey> {
    let mut rng = rng(seed);
    let mut seen = HashSet::new();
    while seen.len() < count {
        let n = rng.gen_range(4..=9);
        seen.insert(PackedKey::pack(&random_dag(&mut rng, n, 0.5)));
    }
    seen.into_iter().collect()
}

#[test]
fn test_concurrent_insert_exactly_one_winner() {
    let set = ShardedKeySet::new(16);
    let keys = keys(500, 1);
    let winners = AtomicUsize::new(0);
    // Every key is inserted by eight threads at once.
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for key in &keys {
                    if set.insert_if_absent(*key) {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });
    assert_eq!(winners.load(Ordering::Relaxed), keys.len());
    assert_eq!(set.size(), keys.len());
    assert!(keys.iter().all(|key| set.lookup(key)));
}

#[test]
fn test_parallel_mixed_operations() {
    let set = ShardedKeySet::new(7);
    let keys = keys(2000, 2);
    set.reserve(keys.len());
    keys.par_iter().for_each(|key| {
        assert!(set.insert_if_absent(*key));
    });
    let removed: usize = keys
        .par_iter()
        .enumerate()
        .filter(|(i, key)| i % 3 == 0 && set.remove(key))
        .count();
    assert_eq!(removed, keys.len().div_ceil(3));
    assert_eq!(set.size(), keys.len() - removed);
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(set.lookup(key), i % 3 != 0);
    }
    let mut listed = set.keys();
    listed.sort();
    let mut expected: Vec<PackedKey> = keys
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, key)| *key)
        .collect();
    expected.sort();
    assert_eq!(listed, expected);
}

#[test]
fn test_flat_set_matches_hash_set() {
    let mut rng = rng(3);
    let pool = keys(300, 4);
    let mut flat = FlatKeySet::new();
    let mut reference = HashSet::new();
    for _ in 0..20_000 {
        let key = pool[rng.gen_range(0..pool.len())];
        match rng.gen_range(0..3) {
            0 => assert_eq!(flat.insert_if_absent(key), reference.insert(key)),
            1 => assert_eq!(flat.remove(&key), reference.remove(&key)),
            _ => assert_eq!(flat.lookup(&key), reference.contains(&key)),
        }
        assert_eq!(flat.len(), reference.len());
    }
    let listed: HashSet<PackedKey> = flat.iter().collect();
    assert_eq!(listed, reference);
}

#[test]
fn test_remove_then_lookup_survives_growth() {
    let keys = keys(5000, 5);
    let mut flat = FlatKeySet::with_capacity(8);
    for key in &keys {
        flat.insert_if_absent(*key);
    }
    for key in keys.iter().step_by(2) {
        assert!(flat.remove(key));
        assert!(!flat.lookup(key));
    }
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(flat.lookup(key), i % 2 == 1);
    }
    assert_eq!(flat.len(), keys.len() / 2);
}
