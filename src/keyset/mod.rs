// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Open-addressing key sets.
//!
//! [`FlatKeySet`] is a plain single-threaded table. [`ShardedKeySet`] wraps
//! an array of them behind per-shard mutexes and is the cross-thread
//! dedup store of a run.

pub mod flat;
pub mod hash;
pub mod sharded;

pub use flat::FlatKeySet;
pub use hash::FixedKey;
pub use sharded::{ShardedKeySet, DEFAULT_SHARDS};
