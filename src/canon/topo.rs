// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Topological relabelling (Kahn's algorithm).

use crate::error::OracleError;
use crate::matrix::{AdjacencyMatrix, MAX_DIM};
use arrayvec::ArrayVec;

/// Relabel `matrix` along a topological order, making it strictly upper
/// triangular.
///
/// Sources are queued in index order and successors are appended as their
/// in-degree drops to zero, first in first out. Fails with
/// [`OracleError::Cyclic`] if some vertex is never released, which
/// includes any vertex with a self-loop.
pub fn topological_relabel(matrix: &AdjacencyMatrix) -> Result<AdjacencyMatrix, OracleError> {
    let n = matrix.n();
    let mut in_degree = [0u8; MAX_DIM];
    for (v, degree) in in_degree.iter_mut().enumerate().take(n) {
        *degree = matrix.column(v).count_ones() as u8;
    }

    let mut order: ArrayVec<u8, MAX_DIM> = (0..n as u8)
        .filter(|&v| in_degree[v as usize] == 0)
        .collect();
    let mut head = 0;
    while head < order.len() {
        let u = order[head] as usize;
        head += 1;
        let row = matrix.row(u);
        for v in 0..n {
            if (row >> v) & 1 == 1 {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    order.push(v as u8);
                }
            }
        }
    }
    if order.len() != n {
        return Err(OracleError::Cyclic);
    }
    let upper = matrix.relabel(&order);
    debug_assert!(upper.is_strictly_upper());
    Ok(upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_path() {
        let m = AdjacencyMatrix::from_edges(4, &[(3, 2), (2, 1), (1, 0)]).unwrap();
        let upper = topological_relabel(&m).unwrap();
        assert_eq!(
            upper,
            AdjacencyMatrix::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap()
        );
    }

    #[test]
    fn test_fifo_order() {
        // Sources 1 and 3; 1 releases 0, 3 releases 2.
        let m = AdjacencyMatrix::from_edges(4, &[(1, 0), (3, 2)]).unwrap();
        // Order is 1, 3, 0, 2.
        assert_eq!(
            topological_relabel(&m).unwrap(),
            AdjacencyMatrix::from_edges(4, &[(0, 2), (1, 3)]).unwrap()
        );
    }

    #[test]
    fn test_upper_input_is_fixed() {
        let m = AdjacencyMatrix::from_edges(3, &[(0, 1), (0, 2), (1, 2)]).unwrap();
        assert_eq!(topological_relabel(&m), Ok(m));
    }

    #[test]
    fn test_cycles_rejected() {
        let loop_ = AdjacencyMatrix::from_edges(2, &[(1, 1)]).unwrap();
        assert_eq!(topological_relabel(&loop_), Err(OracleError::Cyclic));
        let triangle = AdjacencyMatrix::from_edges(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
        assert_eq!(topological_relabel(&triangle), Err(OracleError::Cyclic));
    }
}
