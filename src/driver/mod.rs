// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Stream drivers.
//!
//! Each driver reads newline-delimited wire lines from a [`BufRead`],
//! decides per line what to write, and writes wire lines to a [`Write`].
//! Lines that fail to decode are logged, counted and skipped.
//!
//! | Command | Driver | Parallel |
//! |---|---|---|
//! | `populate` | [`populate_stream`] | no |
//! | `minimal` | [`minimal_stream`] | yes |
//! | `unique` | [`unique_stream`] | yes |
//! | `canon` | [`canonical_stream`] | yes |
//! | `upper` | [`upper_stream`] | yes |
//!
//! Parallel drivers read the input in batches of
//! [`Settings::batch_lines`] lines; the next batch is read while the
//! current one is processed, and output keeps input order.

pub mod batch;
pub mod minimal;
pub mod options;
pub mod population;
pub mod statistics;
pub mod transform;
pub mod unique;

pub use minimal::minimal_stream;
pub use options::{Command, Invocation};
pub use population::populate_stream;
pub use statistics::{Counters, Statistics};
pub use transform::{canonical_stream, upper_stream};
pub use unique::unique_stream;

use crate::error::{ConfigError, DriverError};
use crate::keyset::DEFAULT_SHARDS;
use crate::orbit::OrbitLimits;
use std::io::{BufRead, Write};

/// Default number of lines per batch.
pub const DEFAULT_BATCH_LINES: usize = 100_000;

/// Which key represents an accepted line in the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Representative {
    /// The input line itself.
    #[default]
    Candidate,
    /// The canonical form of the input line.
    Canonical,
    /// The smallest canonical key of the line's orbit (population only;
    /// the minimality test accepts only lines whose canonical key already
    /// is the minimum).
    OrbitMinimum,
}

/// Run-time configuration shared by all drivers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    pub shards: usize,
    pub batch_lines: usize,
    /// Keys to reserve in the shared set before the run.
    pub reserve: usize,
    /// Deduplicate accepted lines by canonical key (`minimal`).
    pub unique: bool,
    /// Compare canonical forms instead of raw keys (`unique`).
    pub canonicalize: bool,
    pub frontier_limit: Option<usize>,
    pub representative: Representative,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            threads: 0,
            shards: DEFAULT_SHARDS,
            batch_lines: DEFAULT_BATCH_LINES,
            reserve: 0,
            unique: false,
            canonicalize: false,
            frontier_limit: None,
            representative: Representative::Candidate,
        }
    }
}

impl Settings {
    pub fn limits(&self) -> OrbitLimits {
        OrbitLimits {
            max_frontier: self.frontier_limit,
        }
    }

    pub(crate) fn thread_pool(&self) -> Result<rayon::ThreadPool, DriverError> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?)
    }
}

/// Run `command` over `input`, writing to `output`.
pub fn run<R, W>(
    command: Command,
    settings: &Settings,
    input: R,
    output: W,
) -> Result<Statistics, DriverError>
where
    R: BufRead + Send,
    W: Write,
{
    match command {
        Command::Populate => populate_stream(settings, input, output),
        Command::Minimal => minimal_stream(settings, input, output),
        Command::Unique => unique_stream(settings, input, output),
        Command::Canon => canonical_stream(settings, input, output),
        Command::Upper => upper_stream(settings, input, output),
    }
}

/// Parse a count with an optional scale suffix.
///
/// `K M G T P E` multiply by powers of 1000, `Ki Mi Gi Ti Pi Ei` by powers
/// of 1024; suffixes are case-insensitive, may follow whitespace, and may
/// carry a trailing `B`. For example `500k`, `2M`, `2Mi`, `1GiB`.
pub fn parse_scaled_size(text: &str) -> Result<usize, ConfigError> {
    let invalid = || ConfigError::InvalidSize(text.to_string());
    let trimmed = text.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 {
        return Err(invalid());
    }
    let base: u64 = trimmed[..digits_end]
        .parse()
        .map_err(|_| ConfigError::SizeOverflow(text.to_string()))?;

    let suffix = trimmed[digits_end..].trim_start().to_ascii_uppercase();
    let mut rest = suffix.as_str();
    let power = match rest.chars().next() {
        None => 0,
        Some(c) => {
            let power = "KMGTPE".find(c).ok_or_else(invalid)? as u32 + 1;
            rest = &rest[1..];
            power
        }
    };
    let radix: u64 = match rest.strip_prefix('I') {
        Some(tail) => {
            rest = tail;
            1024
        }
        None => 1000,
    };
    rest = rest.strip_prefix('B').unwrap_or(rest);
    if !rest.is_empty() {
        return Err(invalid());
    }

    let overflow = || ConfigError::SizeOverflow(text.to_string());
    let multiplier = radix.checked_pow(power).ok_or_else(overflow)?;
    let value = base.checked_mul(multiplier).ok_or_else(overflow)?;
    usize::try_from(value).map_err(|_| overflow())
}
