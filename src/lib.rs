// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Orbit census of small adjacency matrices.
//!
//! A matrix on `n <= 11` vertices is packed into a 128-bit key. Two
//! elementary transformations, conditional column addition and
//! conditional row addition, generate orbits of matrices; matrices are
//! identified up to relabelling by their canonical key. The crate emits
//! one representative per orbit.
//!
//! # Architecture
//!
//! - [`matrix`]: the [`AdjacencyMatrix`] value type and the elementary
//!   transformations.
//! - [`pack`]: [`PackedKey`] and its `&`-prefixed text encoding.
//! - [`keyset`]: open-addressing key sets; [`ShardedKeySet`] is shared
//!   between threads, [`FlatKeySet`] is thread-private.
//! - [`canon`]: the [`CanonicalOracle`] interface and the
//!   [`RefinementOracle`] implementation.
//! - [`orbit`]: [`OrbitEngine`], which walks orbits either to populate a
//!   global key set or to test a candidate for orbit minimality.
//! - [`driver`]: line-oriented stream drivers behind the `orbits` binary.
//!
//! # Parallelization
//!
//! The minimality test decides every candidate independently and runs on
//! a rayon pool with one engine per worker. Population depends on input
//! order and runs on one thread.

pub mod canon;
pub mod driver;
pub mod error;
pub mod keyset;
pub mod matrix;
pub mod orbit;
pub mod pack;

// Re-export commonly used types
pub use canon::{CanonicalOracle, RefinementOracle};
pub use error::{DecodeError, DriverError, OracleError};
pub use keyset::{FlatKeySet, ShardedKeySet};
pub use matrix::AdjacencyMatrix;
pub use orbit::{Minimality, OrbitEngine, OrbitLimits, Population};
pub use pack::{decode_text, encode_text, PackedKey};
