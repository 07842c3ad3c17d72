// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! 128-bit packed keys.
//!
//! # Layout
//!
//! The key is a `u128` whose little-endian byte image is the stored form:
//!
//! - bits 124..=127 (the high nibble of byte 15) hold the dimension `n`;
//! - the low `n²` bits hold the matrix row-major, row 0 first, with
//!   column 0 as the most significant bit of each row, so entry `(i, j)`
//!   sits at bit `n² - 1 - (i·n + j)`;
//! - every other bit is zero.
//!
//! Keys are ordered as unsigned 128-bit integers.

use crate::error::KeyError;
use crate::matrix::constants::{DIM_SHIFT, KEY_BYTES, MAX_DIM};
use crate::matrix::AdjacencyMatrix;
use std::fmt;

const BODY_MASK: u128 = (1u128 << DIM_SHIFT) - 1;

/// A matrix and its dimension packed into 16 bytes.
///
/// `PackedKey::default()` is the all-zero key. It carries dimension 0, so
/// it is never the packing of a matrix and serves as an empty-slot filler.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedKey(u128);

impl PackedKey {
    /// Pack a matrix. Bits beyond `n²` are zero and the nibble is `n`.
    pub fn pack(matrix: &AdjacencyMatrix) -> Self {
        let n = matrix.n();
        let nn = (n * n) as u32;
        let mut body = 0u128;
        for (i, &row) in matrix.rows().iter().enumerate() {
            let chunk = row_to_chunk(row, n);
            body |= (chunk as u128) << (nn - ((i + 1) * n) as u32);
        }
        let key = PackedKey(body | ((n as u128) << DIM_SHIFT));
        debug_assert_eq!(key.get_n(), n);
        key
    }

    /// Unpack into a matrix. Inverse of [`PackedKey::pack`].
    pub fn unpack(&self) -> AdjacencyMatrix {
        let n = self.get_n();
        debug_assert!((1..=MAX_DIM).contains(&n), "unpacking key {:?}", self);
        let nn = (n * n) as u32;
        let mask = (1u128 << n) - 1;
        let mut matrix = AdjacencyMatrix::empty_unchecked(n as u8);
        for (i, row) in matrix.rows_mut().iter_mut().enumerate() {
            let chunk = (self.0 >> (nn - ((i + 1) * n) as u32)) & mask;
            *row = chunk_to_row(chunk as u16, n);
        }
        matrix
    }

    /// The dimension stored in the nibble.
    #[inline]
    pub fn get_n(&self) -> usize {
        (self.0 >> DIM_SHIFT) as usize
    }

    /// Change the stored dimension, clearing adjacency bits beyond the new
    /// `n²` so the key stays well formed.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not in `1..=MAX_DIM`.
    pub fn set_n(&mut self, n: usize) {
        assert!((1..=MAX_DIM).contains(&n), "dimension {} out of range", n);
        let body = self.0 & ((1u128 << (n * n)) - 1);
        self.0 = body | ((n as u128) << DIM_SHIFT);
    }

    #[inline]
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Little-endian byte image.
    #[inline]
    pub fn to_bytes(&self) -> [u8; KEY_BYTES] {
        self.0.to_le_bytes()
    }

    /// Parse a little-endian byte image, checking the nibble and padding.
    pub fn from_bytes(bytes: [u8; KEY_BYTES]) -> Result<Self, KeyError> {
        Self::from_u128(u128::from_le_bytes(bytes))
    }

    pub fn from_u128(raw: u128) -> Result<Self, KeyError> {
        let nibble = (raw >> DIM_SHIFT) as u8;
        let n = nibble as usize;
        if !(1..=MAX_DIM).contains(&n) {
            return Err(KeyError::DimensionOutOfRange { nibble });
        }
        if (raw & BODY_MASK) >> (n * n) != 0 {
            return Err(KeyError::NonZeroPadding { n });
        }
        Ok(PackedKey(raw))
    }

    /// Build directly from a validated integer. Used by the wire decoder,
    /// which constructs well-formed keys by construction.
    #[inline]
    pub(crate) fn from_raw(raw: u128) -> Self {
        debug_assert!(Self::from_u128(raw).is_ok(), "malformed raw key {:#x}", raw);
        PackedKey(raw)
    }
}

/// Row word (bit `j` = column `j`) to packed chunk (column 0 most significant).
#[inline]
fn row_to_chunk(row: u16, n: usize) -> u16 {
    row.reverse_bits() >> (16 - n)
}

#[inline]
fn chunk_to_row(chunk: u16, n: usize) -> u16 {
    chunk.reverse_bits() >> (16 - n)
}

impl From<&AdjacencyMatrix> for PackedKey {
    fn from(matrix: &AdjacencyMatrix) -> Self {
        PackedKey::pack(matrix)
    }
}

impl fmt::Debug for PackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedKey({:#034x})", self.0)
    }
}

impl fmt::Display for PackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::wire::encode_wire(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_matrix_literal() {
        let key = PackedKey::pack(&AdjacencyMatrix::empty(3));
        let mut expected = [0u8; KEY_BYTES];
        expected[15] = 0x30;
        assert_eq!(key.to_bytes(), expected);
        assert_eq!(key.get_n(), 3);
    }

    #[test]
    fn test_bit_positions() {
        // Entry (0, 0) is the most significant of the n² bits.
        let key = PackedKey::pack(&AdjacencyMatrix::from_edges(3, &[(0, 0)]).unwrap());
        assert_eq!(key.as_u128() & BODY_MASK, 1 << 8);
        // Entry (n-1, n-1) is bit 0.
        let key = PackedKey::pack(&AdjacencyMatrix::from_edges(3, &[(2, 2)]).unwrap());
        assert_eq!(key.as_u128() & BODY_MASK, 1);
        // Entry (0, 1) of a 2x2 matrix is bit 4 - 1 - 1 = 2.
        let key = PackedKey::pack(&AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap());
        assert_eq!(key.as_u128(), (2u128 << DIM_SHIFT) | 0b0100);
    }

    #[test]
    fn test_unpack_full_matrix() {
        let rows: Vec<u16> = (0..MAX_DIM as u16).map(|i| 0x7ff ^ (1 << i)).collect();
        let matrix = AdjacencyMatrix::from_rows(&rows).unwrap();
        let key = PackedKey::pack(&matrix);
        assert_eq!(key.get_n(), 11);
        assert_eq!(key.unpack(), matrix);
    }

    #[test]
    fn test_set_n_clears_high_bits() {
        let full = AdjacencyMatrix::from_rows(&[0b111, 0b111, 0b111]).unwrap();
        let mut key = PackedKey::pack(&full);
        key.set_n(2);
        assert_eq!(key.get_n(), 2);
        assert!(PackedKey::from_u128(key.as_u128()).is_ok());
        // The low four bits of the 3x3 body are entries (1,2), (2,0), (2,1), (2,2).
        assert_eq!(key.unpack().edge_count(), 4);
    }

    #[test]
    fn test_from_bytes_validation() {
        let mut bytes = [0u8; KEY_BYTES];
        assert_eq!(
            PackedKey::from_bytes(bytes),
            Err(KeyError::DimensionOutOfRange { nibble: 0 })
        );
        bytes[15] = 0xc0;
        assert_eq!(
            PackedKey::from_bytes(bytes),
            Err(KeyError::DimensionOutOfRange { nibble: 12 })
        );
        bytes[15] = 0x20;
        bytes[0] = 0x10;
        assert_eq!(
            PackedKey::from_bytes(bytes),
            Err(KeyError::NonZeroPadding { n: 2 })
        );
        bytes[0] = 0x0f;
        assert_eq!(PackedKey::from_bytes(bytes).unwrap().unpack().edge_count(), 4);
    }

    #[test]
    fn test_order_is_unsigned_integer_order() {
        let a = PackedKey::pack(&AdjacencyMatrix::from_edges(3, &[(2, 2)]).unwrap());
        let b = PackedKey::pack(&AdjacencyMatrix::from_edges(3, &[(0, 0)]).unwrap());
        let c = PackedKey::pack(&AdjacencyMatrix::empty(4));
        assert!(a < b);
        assert!(b < c);
    }
}
