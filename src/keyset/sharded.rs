// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Concurrent set built from independently locked [`FlatKeySet`] shards.

use super::flat::FlatKeySet;
use super::hash::FixedKey;
use crate::pack::PackedKey;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Extra headroom per shard in [`ShardedKeySet::reserve`], since keys never
/// spread perfectly evenly.
pub const RESERVE_SKEW: f64 = 1.15;

/// Default number of shards for a run.
pub const DEFAULT_SHARDS: usize = 256;

/// A set of keys shared between worker threads.
///
/// Each key lives in shard `hash mod S`; every operation locks exactly one
/// shard, so operations on the same key are serialized and
/// [`insert_if_absent`](Self::insert_if_absent) returns true for exactly
/// one of any number of racing callers.
///
/// The handle is shared by reference (`&ShardedKeySet`) for the duration
/// of a run and released on drop.
pub struct ShardedKeySet<K: FixedKey = PackedKey> {
    shards: Box<[Mutex<FlatKeySet<K>>]>,
    len: AtomicUsize,
}

impl<K: FixedKey> ShardedKeySet<K> {
    /// Create a set with `shard_count` shards (zero is treated as one).
    /// Shard tables are allocated lazily.
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(FlatKeySet::new()))
            .collect();
        ShardedKeySet {
            shards,
            len: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Pre-size every shard for `total_expected` keys overall.
    pub fn reserve(&self, total_expected: usize) {
        if total_expected == 0 {
            return;
        }
        let per_shard =
            ((total_expected as f64 / self.shard_count() as f64) * RESERVE_SKEW).ceil() as usize;
        for shard in self.shards.iter() {
            lock(shard).reserve(per_shard);
        }
    }

    /// Insert `key` unless present. Returns true if this call inserted it.
    pub fn insert_if_absent(&self, key: K) -> bool {
        let hash = key.hash64();
        let mut shard = self.shard(hash);
        let inserted = shard.insert_hashed(key, hash);
        if inserted {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        inserted
    }

    /// Remove `key`. Returns true if it was present.
    pub fn remove(&self, key: &K) -> bool {
        let hash = key.hash64();
        let mut shard = self.shard(hash);
        let removed = shard.remove_hashed(key, hash);
        if removed {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    pub fn lookup(&self, key: &K) -> bool {
        let hash = key.hash64();
        self.shard(hash).lookup_hashed(key, hash)
    }

    /// Number of keys. Exact once concurrent mutators have finished.
    #[inline]
    pub fn size(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Visit every key, locking one shard at a time. Keys inserted into an
    /// already visited shard during the walk are not seen.
    pub fn for_each(&self, mut f: impl FnMut(&K)) {
        for shard in self.shards.iter() {
            lock(shard).iter().for_each(|k| f(&k));
        }
    }

    /// Snapshot of all keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.size());
        self.for_each(|k| out.push(*k));
        out
    }

    fn shard(&self, hash: u64) -> MutexGuard<'_, FlatKeySet<K>> {
        lock(&self.shards[(hash % self.shards.len() as u64) as usize])
    }
}

impl<K: FixedKey> Default for ShardedKeySet<K> {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}

impl<K: FixedKey> std::fmt::Debug for ShardedKeySet<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedKeySet")
            .field("shards", &self.shard_count())
            .field("size", &self.size())
            .finish()
    }
}

/// A panicking holder cannot leave a shard half-updated: every mutation
/// completes before any call that could unwind.
fn lock<K: FixedKey>(shard: &Mutex<FlatKeySet<K>>) -> MutexGuard<'_, FlatKeySet<K>> {
    shard.lock().unwrap_or_else(PoisonError::into_inner)
}
