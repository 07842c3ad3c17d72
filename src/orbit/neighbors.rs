// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! One step of the orbit walk.

use crate::matrix::AdjacencyMatrix;
use std::ops::ControlFlow;

/// Visit every matrix one elementary transformation away from `matrix`.
///
/// Order: `conditional_add_col(k)` for each `k`, then for each `l < m` the
/// applicable ones of `conditional_add_row(l, m)` and
/// `conditional_add_row(m, l)`. Stops early when `visit` breaks.
pub fn try_for_each_neighbor<B>(
    matrix: &AdjacencyMatrix,
    mut visit: impl FnMut(AdjacencyMatrix) -> ControlFlow<B>,
) -> ControlFlow<B> {
    let n = matrix.n();
    for k in 0..n {
        visit(matrix.conditional_add_col(k))?;
    }
    for l in 0..n {
        for m in (l + 1)..n {
            if let Some(next) = matrix.conditional_add_row(l, m) {
                visit(next)?;
            }
            if let Some(next) = matrix.conditional_add_row(m, l) {
                visit(next)?;
            }
        }
    }
    ControlFlow::Continue(())
}

/// Visit every neighbor of `matrix`, without early exit.
pub fn for_each_neighbor(matrix: &AdjacencyMatrix, mut visit: impl FnMut(AdjacencyMatrix)) {
    let _ = try_for_each_neighbor::<()>(matrix, |next| {
        visit(next);
        ControlFlow::Continue(())
    });
}
