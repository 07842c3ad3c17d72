// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Keys storable in the open-addressing sets.

use crate::pack::PackedKey;

/// A fixed-size, copyable key with a well-mixed 64-bit hash.
///
/// `Default` supplies the filler value for empty slots; it is never
/// observable through the set API.
pub trait FixedKey: Copy + Eq + Default + Send + Sync + 'static {
    fn hash64(&self) -> u64;
}

impl FixedKey for PackedKey {
    #[inline]
    fn hash64(&self) -> u64 {
        let raw = self.as_u128();
        let lo = raw as u64;
        let hi = (raw >> 64) as u64;
        mix64(lo.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ hi)
    }
}

/// SplitMix64 finalizer.
#[inline]
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
