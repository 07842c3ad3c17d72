// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Per-run counters, filled in by the drivers as each line's outcome is
//! written out.

use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
pub enum Counters {
    LinesRead,
    /// Lines that failed to decode.
    Rejected,
    /// Lines written to the output.
    Representatives,
    /// Population candidates whose orbit was already recorded.
    Absorbed,
    NotMinimal,
    /// Minimality walks stopped by the frontier limit.
    Undecided,
    /// Accepted lines dropped by the uniqueness filter.
    Duplicates,
    /// Population walks stopped by the frontier limit.
    Truncated,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; Counters::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn increment_counter(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    /// Non-zero counters as `name=value` pairs, for log lines.
    pub fn summary(&self) -> String {
        use strum::IntoEnumIterator;
        Counters::iter()
            .filter(|&c| self.get(c) > 0)
            .map(|c| format!("{}={}", <&'static str>::from(c), self.get(c)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
