// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Dense set-word graphs.
//!
//! Each vertex owns one 64-bit set word, and vertex `j` is bit `63 - j`,
//! so the first vertex is the most significant bit. This is the layout
//! dense graph libraries expect; an [`AdjacencyMatrix`] row is its bit
//! reversal.

use crate::matrix::{AdjacencyMatrix, MAX_DIM};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DenseGraph {
    n: usize,
    sets: [u64; MAX_DIM],
}

impl DenseGraph {
    pub fn n(&self) -> usize {
        self.n
    }

    /// Set word of vertex `v`.
    pub fn set(&self, v: usize) -> u64 {
        self.sets[v]
    }

    pub fn has_arc(&self, from: usize, to: usize) -> bool {
        self.sets[from] & (1u64 << (63 - to)) != 0
    }
}

impl From<&AdjacencyMatrix> for DenseGraph {
    fn from(matrix: &AdjacencyMatrix) -> Self {
        let mut sets = [0u64; MAX_DIM];
        for (set, &row) in sets.iter_mut().zip(matrix.rows()) {
            *set = (row as u64).reverse_bits();
        }
        DenseGraph { n: matrix.n(), sets }
    }
}

impl From<&DenseGraph> for AdjacencyMatrix {
    fn from(graph: &DenseGraph) -> Self {
        let mut matrix = AdjacencyMatrix::empty_unchecked(graph.n as u8);
        for (row, &set) in matrix.rows_mut().iter_mut().zip(graph.sets.iter()) {
            *row = set.reverse_bits() as u16;
        }
        matrix
    }
}
