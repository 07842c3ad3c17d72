// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Compile-time constants for matrices, keys and the wire format.
//!
//! All sizes derive from [`MAX_DIM`]: an 11×11 matrix has 121 adjacency
//! bits, which together with a 4-bit dimension nibble fits in 128 bits.

/// Largest supported matrix dimension.
pub const MAX_DIM: usize = 11;

/// Number of adjacency bits in a full [`MAX_DIM`] matrix.
pub const MAX_BITS: usize = MAX_DIM * MAX_DIM;

/// Size of a packed key in bytes.
pub const KEY_BYTES: usize = 16;

/// Bit offset of the dimension nibble inside a packed key.
pub const DIM_SHIFT: u32 = 124;

/// First byte of every wire line.
pub const WIRE_MARKER: u8 = b'&';

/// Bias added to the size byte and to each 6-bit body group.
pub const WIRE_BIAS: u8 = 63;

/// Bits carried by one body byte.
pub const WIRE_GROUP_BITS: usize = 6;

/// Number of body bytes for a matrix of dimension `n`.
pub const fn wire_body_len(n: usize) -> usize {
    (n * n).div_ceil(WIRE_GROUP_BITS)
}

/// Longest wire line: marker, size byte and the body of an 11×11 matrix.
pub const MAX_WIRE_LEN: usize = 2 + wire_body_len(MAX_DIM);

// 121 adjacency bits must stay below the dimension nibble.
const _: () = assert!(MAX_BITS <= DIM_SHIFT as usize);
const _: () = assert!(MAX_WIRE_LEN == 23);
