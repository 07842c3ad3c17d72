// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fixed-size square binary matrices.

use super::constants::MAX_DIM;
use crate::error::MatrixError;
use std::fmt;

/// A square binary matrix of dimension 1..=11, viewed as a directed graph.
///
/// Row `i` is an `n`-bit word: bit `j` is set exactly when there is an
/// edge `i → j`. Rows at or beyond `n`, and bits at or beyond `n`, are
/// always zero, so derived equality and hashing compare the logical matrix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdjacencyMatrix {
    n: u8,
    rows: [u16; MAX_DIM],
}

impl AdjacencyMatrix {
    /// Create the `n`×`n` zero matrix.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not in `1..=MAX_DIM`.
    pub fn empty(n: usize) -> Self {
        Self::try_empty(n).unwrap_or_else(|| panic!("matrix dimension {} out of range", n))
    }

    /// Create the `n`×`n` zero matrix, or `None` if `n` is out of range.
    pub fn try_empty(n: usize) -> Option<Self> {
        if (1..=MAX_DIM).contains(&n) {
            Some(Self {
                n: n as u8,
                rows: [0; MAX_DIM],
            })
        } else {
            None
        }
    }

    /// Build a matrix from its row words; the dimension is `rows.len()`.
    pub fn from_rows(rows: &[u16]) -> Result<Self, MatrixError> {
        let mut matrix = Self::try_empty(rows.len())
            .ok_or(MatrixError::DimensionOutOfRange { n: rows.len() })?;
        let mask = matrix.row_mask();
        for (i, &row) in rows.iter().enumerate() {
            if row & !mask != 0 {
                return Err(MatrixError::StrayBits { row: i, bits: row });
            }
            matrix.rows[i] = row;
        }
        Ok(matrix)
    }

    /// Build an `n`×`n` matrix containing exactly the given edges.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, MatrixError> {
        let mut matrix = Self::try_empty(n).ok_or(MatrixError::DimensionOutOfRange { n })?;
        for &(from, to) in edges {
            for vertex in [from, to] {
                if vertex >= n {
                    return Err(MatrixError::VertexOutOfRange { vertex, n });
                }
            }
            matrix.rows[from] |= 1 << to;
        }
        Ok(matrix)
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n as usize
    }

    /// Mask of the valid bits within a row.
    #[inline]
    pub fn row_mask(&self) -> u16 {
        ((1u32 << self.n) - 1) as u16
    }

    #[inline]
    pub fn row(&self, i: usize) -> u16 {
        self.rows[i]
    }

    /// The `n` meaningful rows.
    #[inline]
    pub fn rows(&self) -> &[u16] {
        &self.rows[..self.n()]
    }

    /// Column `j` as a word whose bit `i` is entry `(i, j)`.
    pub fn column(&self, j: usize) -> u16 {
        self.rows()
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &row)| acc | (((row >> j) & 1) << i))
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        debug_assert!(i < self.n() && j < self.n());
        (self.rows[i] >> j) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        debug_assert!(i < self.n() && j < self.n());
        if value {
            self.rows[i] |= 1 << j;
        } else {
            self.rows[i] &= !(1 << j);
        }
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, i: usize) -> &mut u16 {
        &mut self.rows[i]
    }

    #[inline]
    pub(crate) fn rows_mut(&mut self) -> &mut [u16] {
        let n = self.n();
        &mut self.rows[..n]
    }

    /// Number of set entries.
    pub fn edge_count(&self) -> u32 {
        self.rows().iter().map(|row| row.count_ones()).sum()
    }

    /// True when every edge goes from a lower to a strictly higher index.
    pub fn is_strictly_upper(&self) -> bool {
        self.rows()
            .iter()
            .enumerate()
            .all(|(i, &row)| row & ((2u32 << i) - 1) as u16 == 0)
    }

    /// Relabel vertices so that new vertex `i` is old vertex `perm[i]`.
    ///
    /// The result satisfies `result[i][j] == self[perm[i]][perm[j]]`.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) if `perm` is not a permutation of `0..n`.
    pub fn relabel(&self, perm: &[u8]) -> Self {
        let n = self.n();
        debug_assert_eq!(perm.len(), n);
        debug_assert_eq!(
            perm.iter().fold(0u32, |acc, &p| acc | (1 << p)),
            (1u32 << n) - 1
        );
        let mut out = Self::empty_unchecked(self.n);
        for (i, &pi) in perm.iter().enumerate() {
            let src = self.rows[pi as usize];
            let mut row = 0u16;
            for (j, &pj) in perm.iter().enumerate() {
                row |= ((src >> pj) & 1) << j;
            }
            out.rows[i] = row;
        }
        out
    }

    #[inline]
    pub(crate) fn empty_unchecked(n: u8) -> Self {
        debug_assert!((1..=MAX_DIM as u8).contains(&n));
        Self {
            n,
            rows: [0; MAX_DIM],
        }
    }
}

impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for j in 0..self.n() {
                f.write_str(if (row >> j) & 1 == 1 { "1" } else { "." })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjacencyMatrix(n={}, rows={:?})", self.n, self.rows())
    }
}
