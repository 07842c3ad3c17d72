// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Small square binary matrices and the elementary transformations that
//! generate an orbit.

pub mod adjacency;
pub mod constants;
mod ops;

pub use adjacency::AdjacencyMatrix;
pub use constants::MAX_DIM;
