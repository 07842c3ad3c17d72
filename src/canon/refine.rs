// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Canonical labelling by individualisation and refinement.
//!
//! # Algorithm
//!
//! 1. Start from the unit partition and refine it: vertices are split by
//!    their colour, self-loop, and number of out- and in-neighbours in each
//!    colour, until no cell splits further. Cells are ordered by these
//!    signatures, so the refined partition depends only on the structure of
//!    the graph, never on its labels.
//! 2. If some cell has more than one vertex, take the first such cell and
//!    branch on each of its vertices: individualise it (place it in a new
//!    cell just before the rest of its cell) and refine again.
//! 3. Every leaf is a discrete partition, which is a relabelling. The
//!    canonical form is the relabelled matrix with the smallest
//!    [`PackedKey`] over all leaves.
//!
//! Branches are skipped when an automorphism fixing the current prefix
//! maps them onto a branch already explored. Two sources of automorphisms
//! are used: vertex pairs whose transposition preserves the matrix
//! ("twins"), and leaves that produce the same matrix as the current best.

use super::dense::DenseGraph;
use super::CanonicalOracle;
use crate::matrix::{AdjacencyMatrix, MAX_DIM};
use crate::pack::PackedKey;
use arrayvec::ArrayVec;

/// Automorphisms kept per call for pruning.
const MAX_AUTOMORPHISMS: usize = 32;

/// Colour, self-loop, then an (out, in) count for every colour.
const SIGNATURE_LEN: usize = 2 + 2 * MAX_DIM;

/// Colour of each vertex; colours of a partition with `k` cells are `0..k`.
type Coloring = [u8; MAX_DIM];

/// `perm[i]` is the old vertex placed at new index `i`.
type Perm = [u8; MAX_DIM];

type Vertices = ArrayVec<u8, MAX_DIM>;

/// Canonical oracle using partition refinement.
///
/// Holds per-call scratch state; reuse one instance per thread.
#[derive(Clone, Debug)]
pub struct RefinementOracle {
    /// Smallest leaf so far; `u128::MAX` until the first leaf.
    best_key: u128,
    best_perm: Perm,
    automorphisms: ArrayVec<Perm, MAX_AUTOMORPHISMS>,
    /// `twins[u]` has bit `v` set when swapping `u` and `v` is an automorphism.
    twins: [u16; MAX_DIM],
    leaves: usize,
}

impl Default for RefinementOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl RefinementOracle {
    pub fn new() -> Self {
        RefinementOracle {
            best_key: u128::MAX,
            best_perm: [0; MAX_DIM],
            automorphisms: ArrayVec::new(),
            twins: [0; MAX_DIM],
            leaves: 0,
        }
    }

    /// Leaves visited by the most recent call.
    pub fn last_leaf_count(&self) -> usize {
        self.leaves
    }

    /// Run the search and return the canonical key and labelling.
    fn search_best(&mut self, matrix: &AdjacencyMatrix) -> (PackedKey, Perm) {
        let n = matrix.n();
        self.best_key = u128::MAX;
        self.automorphisms.clear();
        self.leaves = 0;
        self.twins = [0; MAX_DIM];
        for u in 0..n {
            for v in (u + 1)..n {
                if matrix.swap_rows_and_cols(u, v) == *matrix {
                    self.twins[u] |= 1 << v;
                    self.twins[v] |= 1 << u;
                }
            }
        }

        let mut coloring = [0u8; MAX_DIM];
        let cells = refine(matrix, &mut coloring, 1);
        let mut prefix = Vertices::new();
        self.search(matrix, &coloring, cells, &mut prefix);

        debug_assert!(self.leaves > 0 && self.best_key != u128::MAX);
        (PackedKey::from_raw(self.best_key), self.best_perm)
    }

    fn search(
        &mut self,
        matrix: &AdjacencyMatrix,
        coloring: &Coloring,
        cells: usize,
        prefix: &mut Vertices,
    ) {
        let n = matrix.n();
        if cells == n {
            self.leaf(matrix, coloring);
            return;
        }

        let target = first_nontrivial_cell(coloring, n);
        let members: Vertices = (0..n as u8)
            .filter(|&v| coloring[v as usize] == target)
            .collect();
        let mut explored = Vertices::new();
        for &v in &members {
            if !explored.is_empty() {
                let roots = self.orbits(n, prefix);
                if explored.iter().any(|&u| roots[u as usize] == roots[v as usize]) {
                    continue;
                }
            }
            let mut child = individualize(coloring, n, v);
            let child_cells = refine(matrix, &mut child, cells + 1);
            prefix.push(v);
            self.search(matrix, &child, child_cells, prefix);
            prefix.pop();
            explored.push(v);
        }
    }

    fn leaf(&mut self, matrix: &AdjacencyMatrix, coloring: &Coloring) {
        let n = matrix.n();
        self.leaves += 1;
        let mut perm = [0u8; MAX_DIM];
        for v in 0..n {
            perm[coloring[v] as usize] = v as u8;
        }
        let key = PackedKey::pack(&matrix.relabel(&perm[..n])).as_u128();
        if key < self.best_key {
            self.best_key = key;
            self.best_perm = perm;
        } else if key == self.best_key && !self.automorphisms.is_full() {
            // best_perm[i] ↦ perm[i] preserves every entry of the matrix.
            let mut gamma = [0u8; MAX_DIM];
            for i in 0..n {
                gamma[self.best_perm[i] as usize] = perm[i];
            }
            if (0..n).any(|v| gamma[v] as usize != v) {
                self.automorphisms.push(gamma);
            }
        }
    }

    /// Orbit representatives under the automorphisms known to fix every
    /// vertex of `prefix`.
    fn orbits(&self, n: usize, prefix: &[u8]) -> [u8; MAX_DIM] {
        let mut parent: [u8; MAX_DIM] = std::array::from_fn(|v| v as u8);
        let fixed = prefix.iter().fold(0u16, |acc, &p| acc | (1 << p));
        for u in 0..n {
            if fixed & (1 << u) != 0 {
                continue;
            }
            let mut others = self.twins[u] & !fixed;
            while others != 0 {
                let v = others.trailing_zeros() as usize;
                others &= others - 1;
                union(&mut parent, u, v);
            }
        }
        for gamma in &self.automorphisms {
            if prefix.iter().all(|&p| gamma[p as usize] == p) {
                for v in 0..n {
                    union(&mut parent, v, gamma[v] as usize);
                }
            }
        }
        let mut roots = [0u8; MAX_DIM];
        for v in 0..n {
            roots[v] = find(&mut parent, v) as u8;
        }
        roots
    }
}

impl CanonicalOracle for RefinementOracle {
    type Graph = DenseGraph;

    fn canonicalize(&mut self, matrix: &AdjacencyMatrix) -> AdjacencyMatrix {
        let (_, perm) = self.search_best(matrix);
        matrix.relabel(&perm[..matrix.n()])
    }

    fn canonical_key(&mut self, matrix: &AdjacencyMatrix) -> PackedKey {
        self.search_best(matrix).0
    }

    fn to_external_graph(&self, matrix: &AdjacencyMatrix) -> DenseGraph {
        DenseGraph::from(matrix)
    }

    fn from_external_graph(&self, graph: &DenseGraph) -> AdjacencyMatrix {
        AdjacencyMatrix::from(graph)
    }
}

fn first_nontrivial_cell(coloring: &Coloring, n: usize) -> u8 {
    let mut sizes = [0u8; MAX_DIM];
    for &c in &coloring[..n] {
        sizes[c as usize] += 1;
    }
    sizes.iter().position(|&s| s > 1).unwrap_or(0) as u8
}

/// Split vertex `v` out of its cell, ahead of the remaining members.
fn individualize(coloring: &Coloring, n: usize, v: u8) -> Coloring {
    let target = coloring[v as usize];
    let mut doubled = [0u8; MAX_DIM];
    let mut present = 0u32;
    for w in 0..n {
        let c = coloring[w];
        doubled[w] = 2 * c + u8::from(c == target && w != v as usize);
        present |= 1 << doubled[w];
    }
    let mut out = [0u8; MAX_DIM];
    for w in 0..n {
        out[w] = (present & ((1u32 << doubled[w]) - 1)).count_ones() as u8;
    }
    out
}

/// Refine `coloring` (currently `cells` cells) to the coarsest stable
/// partition below it. Returns the new number of cells.
fn refine(matrix: &AdjacencyMatrix, coloring: &mut Coloring, mut cells: usize) -> usize {
    let n = matrix.n();
    let columns: [u16; MAX_DIM] = std::array::from_fn(|v| if v < n { matrix.column(v) } else { 0 });
    while cells < n {
        let mut signatures = [[0u8; SIGNATURE_LEN]; MAX_DIM];
        for v in 0..n {
            let signature = &mut signatures[v];
            signature[0] = coloring[v];
            signature[1] = u8::from(matrix.get(v, v));
            let (out, inn) = (matrix.row(v), columns[v]);
            for w in 0..n {
                let c = coloring[w] as usize;
                signature[2 + 2 * c] += ((out >> w) & 1) as u8;
                signature[3 + 2 * c] += ((inn >> w) & 1) as u8;
            }
        }
        let mut order: Vertices = (0..n as u8).collect();
        order.sort_unstable_by(|&a, &b| signatures[a as usize].cmp(&signatures[b as usize]));

        let mut color = 0u8;
        for k in 0..n {
            let v = order[k] as usize;
            if k > 0 && signatures[v] != signatures[order[k - 1] as usize] {
                color += 1;
            }
            coloring[v] = color;
        }
        let refined = color as usize + 1;
        if refined == cells {
            break;
        }
        cells = refined;
    }
    cells
}

fn find(parent: &mut [u8; MAX_DIM], mut v: usize) -> usize {
    while parent[v] as usize != v {
        let up = parent[v] as usize;
        parent[v] = parent[up];
        v = up;
    }
    v
}

fn union(parent: &mut [u8; MAX_DIM], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        let (lo, hi) = (ra.min(rb), ra.max(rb));
        parent[hi] = lo as u8;
    }
}
