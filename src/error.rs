// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types.
//!
//! Malformed input is recovered per line by the drivers; only I/O,
//! configuration and thread-pool failures end a run.

use crate::matrix::MAX_DIM;

/// A wire line that does not decode to a packed key.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("line does not start with '&'")]
    MissingMarker,
    #[error("line ends before the size byte")]
    MissingSize,
    #[error("size byte {byte:#04x} does not encode a dimension in 1..={}", MAX_DIM)]
    SizeOutOfRange { byte: u8 },
    #[error("expected {expected} body bytes, found {found}")]
    BodyLength { expected: usize, found: usize },
    #[error("body byte {byte:#04x} at position {position} is outside '?'..='~'")]
    InvalidBodyByte { position: usize, byte: u8 },
}

/// Invalid arguments when building a matrix.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("dimension {n} is outside 1..={}", MAX_DIM)]
    DimensionOutOfRange { n: usize },
    #[error("row {row} has bits {bits:#06x} beyond the dimension")]
    StrayBits { row: usize, bits: u16 },
    #[error("vertex {vertex} is out of range for dimension {n}")]
    VertexOutOfRange { vertex: usize, n: usize },
}

/// Raw key bytes that no matrix packs to.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("dimension nibble {nibble} is outside 1..={}", MAX_DIM)]
    DimensionOutOfRange { nibble: u8 },
    #[error("bits beyond the {n}x{n} matrix are set")]
    NonZeroPadding { n: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("graph has a directed cycle; no topological order exists")]
    Cyclic,
}

/// Bad command line or settings value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid size {0:?}")]
    InvalidSize(String),
    #[error("size {0:?} overflows")]
    SizeOverflow(String),
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("missing command")]
    MissingCommand,
    #[error("unknown option {0:?}")]
    UnknownOption(String),
    #[error("option {0} requires a value")]
    MissingValue(String),
    #[error("invalid value {value:?} for option {option}")]
    InvalidValue { option: String, value: String },
}

/// Failure that ends a driver run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("line {line}: {source}")]
    Cyclic {
        line: u64,
        #[source]
        source: OracleError,
    },
}
