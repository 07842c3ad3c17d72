// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Textual wire format, digraph6 style.
//!
//! A line is `'&'`, a size byte `n + 63`, then `ceil(n²/6)` body bytes.
//! The `n²` adjacency bits, in the key's row-major order, are cut into
//! 6-bit groups most significant bit first; each group is biased by 63.
//! The last group is padded with zero bits on the right.

use super::PackedKey;
use crate::error::DecodeError;
use crate::matrix::constants::{
    wire_body_len, DIM_SHIFT, MAX_DIM, MAX_WIRE_LEN, WIRE_BIAS, WIRE_GROUP_BITS, WIRE_MARKER,
};
use arrayvec::ArrayString;

/// Stack buffer holding one encoded line.
pub type WireText = ArrayString<MAX_WIRE_LEN>;

const GROUP_MASK: u128 = (1 << WIRE_GROUP_BITS) - 1;

/// Decode one line (without its newline).
pub fn decode_text(text: impl AsRef<[u8]>) -> Result<PackedKey, DecodeError> {
    let bytes = text.as_ref();
    match bytes.first() {
        Some(&WIRE_MARKER) => {}
        _ => return Err(DecodeError::MissingMarker),
    }
    let size = *bytes.get(1).ok_or(DecodeError::MissingSize)?;
    let n = size.wrapping_sub(WIRE_BIAS) as usize;
    if !(1..=MAX_DIM).contains(&n) {
        return Err(DecodeError::SizeOutOfRange { byte: size });
    }
    let body = &bytes[2..];
    let expected = wire_body_len(n);
    if body.len() != expected {
        return Err(DecodeError::BodyLength {
            expected,
            found: body.len(),
        });
    }

    let mut remaining = n * n;
    let mut acc = 0u128;
    for (position, &byte) in body.iter().enumerate() {
        let group = byte.wrapping_sub(WIRE_BIAS);
        if group as u128 > GROUP_MASK {
            return Err(DecodeError::InvalidBodyByte {
                position: position + 2,
                byte,
            });
        }
        let take = remaining.min(WIRE_GROUP_BITS);
        acc = (acc << take) | (group >> (WIRE_GROUP_BITS - take)) as u128;
        remaining -= take;
    }
    debug_assert_eq!(remaining, 0);
    Ok(PackedKey::from_raw(acc | ((n as u128) << DIM_SHIFT)))
}

/// Encode into a stack buffer.
pub fn encode_wire(key: &PackedKey) -> WireText {
    let n = key.get_n();
    let groups = wire_body_len(n);
    let body = key.as_u128() & ((1u128 << (n * n)) - 1);
    let padded = body << (groups * WIRE_GROUP_BITS - n * n);

    let mut text = WireText::new();
    text.push(WIRE_MARKER as char);
    text.push((n as u8 + WIRE_BIAS) as char);
    for g in (0..groups).rev() {
        let group = ((padded >> (g * WIRE_GROUP_BITS)) & GROUP_MASK) as u8;
        text.push((group + WIRE_BIAS) as char);
    }
    text
}

/// Encode as an owned string. Inverse of [`decode_text`].
pub fn encode_text(key: &PackedKey) -> String {
    encode_wire(key).to_string()
}
