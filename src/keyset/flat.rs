// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Single-threaded open-addressing set.
//!
//! Linear probing over a power-of-two table, with tombstones for removal.
//! The same structure is one shard of a [`super::ShardedKeySet`] and the
//! per-thread visited set of an orbit walk.
//!
//! # Resize policy
//!
//! - Before an insert, if live plus tombstone slots exceed
//!   [`MAX_OCCUPIED_LOAD`], the table is rebuilt: at the same capacity when
//!   the live load is still within [`MAX_LIVE_LOAD`], otherwise grown.
//! - After a remove, a table with more tombstones than live keys (and more
//!   than an eighth of its slots) is compacted; otherwise a table whose live
//!   load fell below [`MIN_LIVE_LOAD`] shrinks, never below
//!   [`SHRINK_FLOOR`] slots.
//!
//! Table allocation goes through the global allocator, which aborts the
//! process if memory is exhausted.

use super::hash::FixedKey;

/// Highest fraction of live-or-tombstone slots tolerated before an insert.
pub const MAX_OCCUPIED_LOAD: f64 = 0.80;
/// Target upper bound for live slots after a resize.
pub const MAX_LIVE_LOAD: f64 = 0.80;
/// Live load under which a remove shrinks the table.
pub const MIN_LIVE_LOAD: f64 = 0.20;
/// Capacity allocated by the first insert into an unsized set.
pub const DEFAULT_CAPACITY: usize = 1024;
/// Smallest table ever allocated.
pub const MIN_CAPACITY: usize = 8;
/// Shrinking stops at this capacity.
pub const SHRINK_FLOOR: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Control {
    #[default]
    Empty,
    Full,
    Tombstone,
}

/// Smallest power of two at least `x`, and at least [`MIN_CAPACITY`].
fn table_size(x: usize) -> usize {
    x.max(MIN_CAPACITY).next_power_of_two()
}

/// Slots needed to hold `count` keys at [`MAX_LIVE_LOAD`].
fn slots_for(count: usize) -> usize {
    (count as f64 / MAX_LIVE_LOAD) as usize + 1
}

/// Probe start. Uses the high half of the hash so that shard selection,
/// which reduces the hash modulo the shard count, does not bias it.
#[inline]
fn home(hash: u64, mask: usize) -> usize {
    (hash.rotate_left(32) as usize) & mask
}

/// Open-addressing set of fixed-size keys.
#[derive(Clone, Debug)]
pub struct FlatKeySet<K: FixedKey> {
    ctrl: Vec<Control>,
    keys: Vec<K>,
    len: usize,
    tombstones: usize,
}

impl<K: FixedKey> Default for FlatKeySet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: FixedKey> FlatKeySet<K> {
    /// An empty set; the table is allocated on first insert.
    pub fn new() -> Self {
        FlatKeySet {
            ctrl: Vec::new(),
            keys: Vec::new(),
            len: 0,
            tombstones: 0,
        }
    }

    /// An empty set with at least `hint` slots allocated up front.
    pub fn with_capacity(hint: usize) -> Self {
        let mut set = Self::new();
        set.allocate(table_size(hint));
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots; zero before the first insert.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ctrl.len()
    }

    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn lookup(&self, key: &K) -> bool {
        self.lookup_hashed(key, key.hash64())
    }

    /// Insert `key` unless present. Returns true if it was inserted.
    pub fn insert_if_absent(&mut self, key: K) -> bool {
        self.insert_hashed(key, key.hash64())
    }

    /// Remove `key`. Returns true if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_hashed(key, key.hash64())
    }

    /// Make room for `expected` keys without further growth, or compact
    /// tombstones if the table is already large enough.
    pub fn reserve(&mut self, expected: usize) {
        if expected == 0 {
            return;
        }
        let need = slots_for(expected);
        if self.capacity() < need {
            self.rehash(need);
        } else if self.tombstones > 0 {
            self.rehash(self.capacity());
        }
    }

    /// Remove every key, keeping the allocated table.
    pub fn clear(&mut self) {
        if self.len + self.tombstones > 0 {
            self.ctrl.fill(Control::Empty);
        }
        self.len = 0;
        self.tombstones = 0;
    }

    /// Live keys in slot order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.ctrl
            .iter()
            .zip(self.keys.iter())
            .filter(|(c, _)| **c == Control::Full)
            .map(|(_, k)| *k)
    }

    pub(crate) fn lookup_hashed(&self, key: &K, hash: u64) -> bool {
        if self.capacity() == 0 {
            return false;
        }
        let mask = self.capacity() - 1;
        let mut i = home(hash, mask);
        loop {
            match self.ctrl[i] {
                Control::Empty => return false,
                Control::Full if self.keys[i] == *key => return true,
                _ => {}
            }
            i = (i + 1) & mask;
        }
    }

    pub(crate) fn insert_hashed(&mut self, key: K, hash: u64) -> bool {
        if self.capacity() == 0 {
            self.allocate(DEFAULT_CAPACITY);
        }
        let cap = self.capacity() as f64;
        if (self.len + self.tombstones) as f64 / cap > MAX_OCCUPIED_LOAD {
            if self.len as f64 / cap <= MAX_LIVE_LOAD {
                self.rehash(self.capacity());
            } else {
                self.rehash(slots_for(self.len + 1));
            }
        }

        let mask = self.capacity() - 1;
        let mut i = home(hash, mask);
        let mut first_tombstone = None;
        loop {
            match self.ctrl[i] {
                Control::Empty => break,
                Control::Tombstone => {
                    first_tombstone.get_or_insert(i);
                }
                Control::Full => {
                    if self.keys[i] == key {
                        return false;
                    }
                }
            }
            i = (i + 1) & mask;
        }
        let slot = match first_tombstone {
            Some(t) => {
                self.tombstones -= 1;
                t
            }
            None => i,
        };
        self.keys[slot] = key;
        self.ctrl[slot] = Control::Full;
        self.len += 1;
        true
    }

    pub(crate) fn remove_hashed(&mut self, key: &K, hash: u64) -> bool {
        if self.capacity() == 0 {
            return false;
        }
        let mask = self.capacity() - 1;
        let mut i = home(hash, mask);
        loop {
            match self.ctrl[i] {
                Control::Empty => return false,
                Control::Full if self.keys[i] == *key => break,
                _ => {}
            }
            i = (i + 1) & mask;
        }
        self.ctrl[i] = Control::Tombstone;
        self.len -= 1;
        self.tombstones += 1;

        if self.tombstones > self.len && self.tombstones > self.capacity() / 8 {
            self.rehash(self.capacity());
        } else {
            self.maybe_shrink();
        }
        true
    }

    fn maybe_shrink(&mut self) {
        let cap = self.capacity();
        if cap > SHRINK_FLOOR && (self.len as f64 / cap as f64) < MIN_LIVE_LOAD {
            let target = table_size(slots_for(self.len).max(SHRINK_FLOOR));
            if target < cap {
                self.rehash(target);
            }
        }
    }

    fn allocate(&mut self, cap: usize) {
        debug_assert!(cap.is_power_of_two());
        self.ctrl = vec![Control::Empty; cap];
        self.keys = vec![K::default(); cap];
        self.len = 0;
        self.tombstones = 0;
    }

    /// Rebuild into a table of at least `min_cap` slots, dropping tombstones.
    fn rehash(&mut self, min_cap: usize) {
        let ctrl = std::mem::take(&mut self.ctrl);
        let keys = std::mem::take(&mut self.keys);
        let live = self.len;
        self.allocate(table_size(min_cap));
        let mask = self.capacity() - 1;
        for (_, key) in ctrl
            .into_iter()
            .zip(keys)
            .filter(|(c, _)| *c == Control::Full)
        {
            let mut i = home(key.hash64(), mask);
            while self.ctrl[i] == Control::Full {
                i = (i + 1) & mask;
            }
            self.ctrl[i] = Control::Full;
            self.keys[i] = key;
            self.len += 1;
        }
        debug_assert_eq!(self.len, live, "rehash lost keys");
        debug_assert_eq!(self.tombstones, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::hash::mix64;

    /// Minimal key whose hash is the identity, to steer probe positions.
    #[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
    struct RawKey(u64);

    impl FixedKey for RawKey {
        fn hash64(&self) -> u64 {
            self.0
        }
    }

    fn spread(i: u64) -> RawKey {
        RawKey(mix64(i + 1))
    }

    #[test]
    fn test_lazy_allocation() {
        let mut set = FlatKeySet::<RawKey>::new();
        assert_eq!(set.capacity(), 0);
        assert!(!set.lookup(&RawKey(5)));
        assert!(!set.remove(&RawKey(5)));
        assert!(set.insert_if_absent(RawKey(5)));
        assert_eq!(set.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_insert_lookup_remove() {
        let mut set = FlatKeySet::with_capacity(16);
        assert!(set.insert_if_absent(RawKey(1)));
        assert!(!set.insert_if_absent(RawKey(1)));
        assert!(set.lookup(&RawKey(1)));
        assert!(set.remove(&RawKey(1)));
        assert!(!set.lookup(&RawKey(1)));
        assert!(!set.remove(&RawKey(1)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_probe_past_tombstone() {
        // Three keys with the same home slot form one probe chain.
        let mut set = FlatKeySet::with_capacity(16);
        let a = RawKey(3 << 32);
        let b = RawKey((3 << 32) | (16 << 32));
        let c = RawKey((3 << 32) | (32 << 32));
        for k in [a, b, c] {
            assert!(set.insert_if_absent(k));
        }
        assert!(set.remove(&b));
        assert_eq!(set.tombstones(), 1);
        // c is still reachable past the tombstone, and is not inserted twice.
        assert!(set.lookup(&c));
        assert!(!set.insert_if_absent(c));
        // A new key reuses the tombstone.
        assert!(set.insert_if_absent(b));
        assert_eq!(set.tombstones(), 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_growth_keeps_load_bounded() {
        let mut set = FlatKeySet::new();
        for i in 0..5000 {
            assert!(set.insert_if_absent(spread(i)));
            assert!(set.len() as f64 <= set.capacity() as f64 * 0.81 + 1.0);
        }
        assert_eq!(set.len(), 5000);
        assert!(set.capacity().is_power_of_two());
        assert!((0..5000).all(|i| set.lookup(&spread(i))));
        assert!(!set.lookup(&spread(5000)));
    }

    #[test]
    fn test_shrink_after_mass_removal() {
        let mut set = FlatKeySet::new();
        for i in 0..4000 {
            set.insert_if_absent(spread(i));
        }
        let grown = set.capacity();
        for i in 0..3990 {
            assert!(set.remove(&spread(i)));
        }
        assert_eq!(set.len(), 10);
        assert!(set.capacity() < grown);
        assert!(set.capacity() >= SHRINK_FLOOR);
        assert!((3990..4000).all(|i| set.lookup(&spread(i))));
    }

    #[test]
    fn test_reserve_and_clear() {
        let mut set = FlatKeySet::<RawKey>::new();
        set.reserve(1000);
        assert!(set.capacity() >= 1250);
        let cap = set.capacity();
        for i in 0..1000 {
            set.insert_if_absent(spread(i));
        }
        assert_eq!(set.capacity(), cap);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), cap);
        assert_eq!(set.iter().count(), 0);
        assert!(!set.lookup(&spread(1)));
    }

    #[test]
    fn test_reserve_compacts_tombstones() {
        let mut set = FlatKeySet::with_capacity(64);
        for i in 0..20 {
            set.insert_if_absent(spread(i));
        }
        set.remove(&spread(0));
        assert_eq!(set.tombstones(), 1);
        set.reserve(10);
        assert_eq!(set.tombstones(), 0);
        assert_eq!(set.len(), 19);
    }
}
