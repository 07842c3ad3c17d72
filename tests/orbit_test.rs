// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

mod common;

use common::{matrix, orbit_classes, random_dag, random_permutation, rng, scrambled_members};
use orbit_census::{
    CanonicalOracle, Minimality, OrbitEngine, OrbitLimits, PackedKey, Population,
    RefinementOracle, ShardedKeySet,
};
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_one_emission_per_orbit() {
    let mut rng = rng(7);
    for n in 3..=5 {
        let start = random_dag(&mut rng, n, 0.5);
        let classes = orbit_classes(&start);
        let members = scrambled_members(&mut rng, &classes);

        let global = ShardedKeySet::new(8);
        let mut engine = OrbitEngine::default();
        let mut emissions = Vec::new();
        for &member in &members {
            if let Population::Emitted(emission) = engine.populate(&global, member) {
                emissions.push(emission);
            }
        }
        assert_eq!(emissions.len(), 1, "n={} start={:?}", n, start);
        let emission = emissions[0];
        assert_eq!(emission.candidate, members[0]);
        assert!(emission.complete);
        assert_eq!(emission.orbit_size, classes.len());
        assert_eq!(Some(&emission.orbit_minimum), classes.iter().next());
        assert_eq!(global.size(), classes.len());
    }
}

#[test]
fn test_distinct_orbits_are_each_emitted() {
    let mut rng = rng(11);
    let global = ShardedKeySet::new(16);
    let mut engine = OrbitEngine::default();
    let mut orbits: Vec<BTreeSet<PackedKey>> = Vec::new();
    let mut emitted = 0;
    for _ in 0..30 {
        let candidate = random_dag(&mut rng, 4, 0.4);
        let classes = orbit_classes(&candidate);
        let is_new = !orbits.contains(&classes);
        match engine.populate(&global, PackedKey::pack(&candidate)) {
            Population::Emitted(_) => {
                assert!(is_new);
                emitted += 1;
                orbits.push(classes);
            }
            Population::Absorbed => assert!(!is_new),
        }
    }
    assert_eq!(emitted, orbits.len());
    let total: usize = orbits.iter().map(BTreeSet::len).sum();
    assert_eq!(global.size(), total);
}

#[test]
fn test_concurrent_populate_emits_once() {
    let mut rng = rng(3);
    let start = random_dag(&mut rng, 5, 0.5);
    let candidates: Vec<PackedKey> = (0..8)
        .map(|_| PackedKey::pack(&start.relabel(&random_permutation(&mut rng, 5))))
        .collect();
    let global = ShardedKeySet::new(4);
    let emitted = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for &candidate in &candidates {
            let global = &global;
            let emitted = &emitted;
            scope.spawn(move || {
                let mut engine = OrbitEngine::default();
                if let Population::Emitted(_) = engine.populate(global, candidate) {
                    emitted.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });
    assert_eq!(emitted.load(Ordering::Relaxed), 1);
    assert_eq!(global.size(), orbit_classes(&start).len());
}

#[test]
fn test_minimality_agrees_with_population() {
    let mut rng = rng(19);
    let mut engine = OrbitEngine::default();
    for n in 3..=4 {
        for _ in 0..5 {
            let classes = orbit_classes(&random_dag(&mut rng, n, 0.5));
            let minimum = *classes.iter().next().unwrap();
            for key in scrambled_members(&mut rng, &classes) {
                let verdict = engine.is_orbit_minimum(key);
                let canonical = engine.oracle_mut().canonical_key(&key.unpack());
                assert_eq!(verdict.is_minimal(), canonical == minimum);
                match verdict {
                    Minimality::Minimal {
                        canonical: found,
                        orbit_size,
                    } => {
                        assert_eq!(found, minimum);
                        assert_eq!(orbit_size, classes.len());
                    }
                    Minimality::NotMinimal { smaller } => {
                        assert!(smaller < canonical);
                        assert!(classes.contains(&smaller));
                    }
                    Minimality::Undecided { .. } => panic!("unbounded walk undecided"),
                }
            }
        }
    }
}

#[test]
fn test_walks_stay_acyclic() {
    let mut rng = rng(23);
    let mut oracle = RefinementOracle::new();
    for _ in 0..10 {
        for key in orbit_classes(&random_dag(&mut rng, 5, 0.3)) {
            assert!(oracle.topological_relabel(&key.unpack()).is_ok());
        }
    }
}

#[test]
fn test_empty_and_full_path() {
    let mut engine = OrbitEngine::default();
    let empty = PackedKey::pack(&matrix(5, &[]));
    assert!(engine.is_orbit_minimum(empty).is_minimal());
    let path = matrix(4, &[(0, 1), (1, 2), (2, 3)]);
    let classes = orbit_classes(&path);
    assert!(classes.len() > 1);
    let global = ShardedKeySet::new(2);
    let Population::Emitted(emission) = engine.populate(&global, PackedKey::pack(&path)) else {
        panic!("first candidate absorbed");
    };
    assert_eq!(emission.orbit_size, classes.len());
}

#[test]
fn test_frontier_limit_bounds_finished_walks() {
    const LIMIT: usize = 3;
    let mut rng = rng(29);
    let mut unbounded = OrbitEngine::default();
    let mut limited =
        OrbitEngine::with_limits(RefinementOracle::new(), OrbitLimits::with_max_frontier(LIMIT));
    let mut finished = 0;
    for _ in 0..400 {
        let n = rng.gen_range(3..=6);
        let candidate = PackedKey::pack(&random_dag(&mut rng, n, 0.5));

        let Population::Emitted(whole) = unbounded.populate(&ShardedKeySet::new(4), candidate)
        else {
            panic!("fresh set absorbed {}", candidate);
        };
        let Population::Emitted(capped) = limited.populate(&ShardedKeySet::new(4), candidate)
        else {
            panic!("fresh set absorbed {}", candidate);
        };
        if capped.complete {
            assert!(capped.orbit_size <= LIMIT, "{} size {}", candidate, capped.orbit_size);
            assert_eq!(capped, whole);
            finished += 1;
        } else {
            assert!(whole.orbit_size > LIMIT, "{} size {}", candidate, whole.orbit_size);
        }

        let canonical = unbounded.oracle_mut().canonical_key(&candidate.unpack());
        match (unbounded.is_orbit_minimum(canonical), limited.is_orbit_minimum(canonical)) {
            (expected, Minimality::Minimal { orbit_size, .. }) => {
                assert!(orbit_size <= LIMIT, "{} size {}", candidate, orbit_size);
                assert_eq!(expected, Minimality::Minimal { canonical, orbit_size });
            }
            (Minimality::Minimal { orbit_size, .. }, Minimality::Undecided { .. }) => {
                assert!(orbit_size > LIMIT)
            }
            (Minimality::Minimal { .. }, other) => panic!("{} decided {:?}", candidate, other),
            _ => {}
        }
    }
    assert!(finished > 0);
}
