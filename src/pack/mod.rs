// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Packed 128-bit keys and their `&`-prefixed text encoding.

pub mod key;
pub mod wire;

pub use key::PackedKey;
pub use wire::{decode_text, encode_text, encode_wire, WireText};
