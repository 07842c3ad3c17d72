// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Canonical forms.
//!
//! A [`CanonicalOracle`] maps every matrix to a fixed representative of
//! its isomorphism class. Oracles are used through `&mut self` so that an
//! implementation can keep scratch space between calls; each worker thread
//! owns its own instance.

pub mod dense;
pub mod refine;
pub mod topo;

pub use dense::DenseGraph;
pub use refine::RefinementOracle;

use crate::error::OracleError;
use crate::matrix::AdjacencyMatrix;
use crate::pack::PackedKey;

pub trait CanonicalOracle {
    /// The oracle's own graph representation.
    type Graph;

    /// Canonical relabelling of `matrix`.
    ///
    /// Must be deterministic and idempotent, and isomorphic inputs must
    /// produce identical outputs.
    fn canonicalize(&mut self, matrix: &AdjacencyMatrix) -> AdjacencyMatrix;

    /// Packed key of the canonical form.
    fn canonical_key(&mut self, matrix: &AdjacencyMatrix) -> PackedKey {
        PackedKey::pack(&self.canonicalize(matrix))
    }

    fn to_external_graph(&self, matrix: &AdjacencyMatrix) -> Self::Graph;

    fn from_external_graph(&self, graph: &Self::Graph) -> AdjacencyMatrix;

    /// Relabel so that every edge points from a lower to a higher index.
    fn topological_relabel(
        &mut self,
        matrix: &AdjacencyMatrix,
    ) -> Result<AdjacencyMatrix, OracleError> {
        topo::topological_relabel(matrix)
    }
}
