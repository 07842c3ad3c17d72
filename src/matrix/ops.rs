// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Elementary transformations.
//!
//! Each operation reads `self` and returns a fresh matrix, so callers can
//! apply every transformation to the same source without copying it first.
//! On loopless acyclic matrices all three are involutions and map acyclic
//! matrices to acyclic matrices.

use super::AdjacencyMatrix;

impl AdjacencyMatrix {
    /// Exchange vertex labels `r1` and `r2`: swaps both the rows and the
    /// bit-columns.
    pub fn swap_rows_and_cols(&self, r1: usize, r2: usize) -> Self {
        debug_assert!(r1 < self.n() && r2 < self.n());
        let mut out = *self;
        if r1 == r2 {
            return out;
        }
        let rows = self.rows();
        for (i, row) in out.rows_mut().iter_mut().enumerate() {
            let src = match i {
                _ if i == r1 => rows[r2],
                _ if i == r2 => rows[r1],
                _ => rows[i],
            };
            let diff = ((src >> r1) ^ (src >> r2)) & 1;
            *row = src ^ ((diff << r1) | (diff << r2));
        }
        out
    }

    /// For every row `i` whose bit `k` is set, XOR row `i` with row `k`.
    ///
    /// Always applicable. Row `k` is read from `self`, never from the
    /// partially built result.
    pub fn conditional_add_col(&self, k: usize) -> Self {
        debug_assert!(k < self.n());
        let pivot = self.row(k);
        let mut out = *self;
        for (i, &row) in self.rows().iter().enumerate() {
            if (row >> k) & 1 == 1 {
                *out.row_mut(i) = row ^ pivot;
            }
        }
        out
    }

    /// Row `m` := row `m` XOR row `l`, provided columns `l` and `m` are
    /// identical across all rows.
    ///
    /// Returns `None` when `l == m` or the columns differ.
    pub fn conditional_add_row(&self, l: usize, m: usize) -> Option<Self> {
        debug_assert!(l < self.n() && m < self.n());
        if l == m {
            return None;
        }
        let same_columns = self
            .rows()
            .iter()
            .all(|&row| ((row >> l) ^ (row >> m)) & 1 == 0);
        if !same_columns {
            return None;
        }
        let mut out = *self;
        *out.row_mut(m) ^= self.row(l);
        Some(out)
    }
}
