// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Minimality filter: keep the lines whose canonical key is the smallest
//! in their orbit.
//!
//! Each line is decided on its own, so batches are tested in parallel with
//! one [`OrbitEngine`] per worker. With [`Settings::unique`], accepted lines
//! are then deduplicated by canonical key in input order, so the first
//! accepted line of each class is the one written.

use super::batch::{run_batches, Line, Outcome, Sink};
use super::statistics::{Counters, Statistics};
use super::{Representative, Settings};
use crate::canon::RefinementOracle;
use crate::error::DriverError;
use crate::keyset::ShardedKeySet;
use crate::orbit::{Minimality, OrbitEngine};
use crate::pack::PackedKey;
use rayon::prelude::*;
use std::io::{BufRead, Write};
use tracing::info;

pub fn minimal_stream<R, W>(
    settings: &Settings,
    input: R,
    output: W,
) -> Result<Statistics, DriverError>
where
    R: BufRead + Send,
    W: Write,
{
    let seen = ShardedKeySet::new(settings.shards);
    if settings.unique && settings.reserve > 0 {
        seen.reserve(settings.reserve);
    }
    let limits = settings.limits();
    let mut sink = Sink::new(output);

    run_batches(settings, input, &mut sink, |lines| {
        let decided: Vec<(Outcome, Option<PackedKey>)> = lines
            .par_iter()
            .map_init(
                || OrbitEngine::with_limits(RefinementOracle::new(), limits),
                |engine, line| decide(engine, settings.representative, line),
            )
            .collect();
        decided
            .into_iter()
            .map(|decision| match decision {
                (Outcome::Write(_), Some(canonical))
                    if settings.unique && !seen.insert_if_absent(canonical) =>
                {
                    Outcome::Skipped(Counters::Duplicates)
                }
                (outcome, _) => outcome,
            })
            .collect()
    })?;

    info!("[Minimal] {}", sink.statistics().summary());
    sink.finish()
}

/// The line's outcome, paired with its canonical key when it was accepted.
fn decide(
    engine: &mut OrbitEngine,
    representative: Representative,
    line: &Line,
) -> (Outcome, Option<PackedKey>) {
    let candidate = match line.decode() {
        Ok(candidate) => candidate,
        Err(err) => return (Outcome::Rejected(err), None),
    };
    match engine.is_orbit_minimum(candidate) {
        Minimality::Minimal { canonical, .. } => {
            let key = match representative {
                Representative::Candidate => candidate,
                Representative::Canonical | Representative::OrbitMinimum => canonical,
            };
            (Outcome::Write(key), Some(canonical))
        }
        Minimality::NotMinimal { .. } => (Outcome::Skipped(Counters::NotMinimal), None),
        Minimality::Undecided { .. } => (Outcome::Skipped(Counters::Undecided), None),
    }
}
