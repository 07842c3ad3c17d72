// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use orbit_census::{AdjacencyMatrix, CanonicalOracle, PackedKey, RefinementOracle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashSet, VecDeque};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn matrix(n: usize, edges: &[(usize, usize)]) -> AdjacencyMatrix {
    AdjacencyMatrix::from_edges(n, edges).unwrap()
}

pub fn random_permutation(rng: &mut StdRng, n: usize) -> Vec<u8> {
    let mut perm: Vec<u8> = (0..n as u8).collect();
    perm.shuffle(rng);
    perm
}

/// A random loopless DAG on `n` vertices, randomly labelled.
pub fn random_dag(rng: &mut StdRng, n: usize, density: f64) -> AdjacencyMatrix {
    let mut upper = AdjacencyMatrix::empty(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen_bool(density) {
                upper.set(i, j, true);
            }
        }
    }
    upper.relabel(&random_permutation(rng, n))
}

/// Canonical keys of the orbit of `start`, found by a breadth-first walk
/// over raw matrices that applies every transformation directly.
pub fn orbit_classes(start: &AdjacencyMatrix) -> BTreeSet<PackedKey> {
    let mut oracle = RefinementOracle::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(*start);
    queue.push_back(*start);
    while let Some(current) = queue.pop_front() {
        let n = current.n();
        let mut next = Vec::new();
        for k in 0..n {
            next.push(current.conditional_add_col(k));
        }
        for l in 0..n {
            for m in 0..n {
                next.extend(current.conditional_add_row(l, m));
            }
        }
        for matrix in next {
            if seen.insert(matrix) {
                queue.push_back(matrix);
            }
        }
    }
    seen.iter().map(|m| oracle.canonical_key(m)).collect()
}

/// Wire lines for the canonical form of every class in `classes`, each
/// under a random relabelling, in random order.
pub fn scrambled_members(rng: &mut StdRng, classes: &BTreeSet<PackedKey>) -> Vec<PackedKey> {
    let mut members: Vec<PackedKey> = classes
        .iter()
        .map(|key| {
            let matrix = key.unpack();
            let perm = random_permutation(rng, matrix.n());
            PackedKey::pack(&matrix.relabel(&perm))
        })
        .collect();
    members.shuffle(rng);
    members
}
