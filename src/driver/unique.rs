// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Drop repeated lines.
//!
//! Lines are compared by packed key, or by canonical key with
//! [`Settings::canonicalize`]. The first line of each key is written as
//! given; canonical forms are computed in parallel and deduplicated in
//! input order.

use super::batch::{run_batches, Line, Outcome, Sink};
use super::statistics::{Counters, Statistics};
use super::Settings;
use crate::canon::{CanonicalOracle, RefinementOracle};
use crate::error::{DecodeError, DriverError};
use crate::keyset::ShardedKeySet;
use crate::pack::PackedKey;
use rayon::prelude::*;
use std::io::{BufRead, Write};
use tracing::info;

pub fn unique_stream<R, W>(
    settings: &Settings,
    input: R,
    output: W,
) -> Result<Statistics, DriverError>
where
    R: BufRead + Send,
    W: Write,
{
    let seen = ShardedKeySet::new(settings.shards);
    if settings.reserve > 0 {
        seen.reserve(settings.reserve);
    }
    let mut sink = Sink::new(output);

    run_batches(settings, input, &mut sink, |lines| {
        let keyed: Vec<Result<(PackedKey, PackedKey), DecodeError>> = if settings.canonicalize {
            lines
                .par_iter()
                .map_init(RefinementOracle::new, |oracle, line| -> Result<_, DecodeError> {
                    let key = line.decode()?;
                    Ok((key, oracle.canonical_key(&key.unpack())))
                })
                .collect()
        } else {
            lines.iter().map(Line::decode).map(|r| r.map(|k| (k, k))).collect()
        };
        keyed
            .into_iter()
            .map(|keyed| match keyed {
                Err(err) => Outcome::Rejected(err),
                Ok((key, identity)) if seen.insert_if_absent(identity) => Outcome::Write(key),
                Ok(_) => Outcome::Skipped(Counters::Duplicates),
            })
            .collect()
    })?;

    info!(
        "[Unique] {} distinct keys; {}",
        seen.size(),
        sink.statistics().summary()
    );
    sink.finish()
}
