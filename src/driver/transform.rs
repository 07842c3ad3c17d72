// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-line relabelling: canonical form and topological order.

use super::batch::{run_batches, Line, Outcome, Sink};
use super::statistics::Statistics;
use super::Settings;
use crate::canon::{CanonicalOracle, RefinementOracle};
use crate::error::{DriverError, OracleError};
use crate::matrix::AdjacencyMatrix;
use crate::pack::PackedKey;
use rayon::prelude::*;
use std::io::{BufRead, Write};
use tracing::info;

/// Replace every line by its canonical form.
pub fn canonical_stream<R, W>(
    settings: &Settings,
    input: R,
    output: W,
) -> Result<Statistics, DriverError>
where
    R: BufRead + Send,
    W: Write,
{
    relabel_stream(settings, input, output, "[Canon]", |oracle, matrix| {
        Ok(oracle.canonicalize(matrix))
    })
}

/// Relabel every line so that all edges point from lower to higher
/// vertices.
///
/// Fails on the first line holding a cycle; lines before it have been
/// written.
pub fn upper_stream<R, W>(
    settings: &Settings,
    input: R,
    output: W,
) -> Result<Statistics, DriverError>
where
    R: BufRead + Send,
    W: Write,
{
    relabel_stream(settings, input, output, "[Upper]", |oracle, matrix| {
        oracle.topological_relabel(matrix)
    })
}

fn relabel_stream<R, W, F>(
    settings: &Settings,
    input: R,
    output: W,
    component: &str,
    relabel: F,
) -> Result<Statistics, DriverError>
where
    R: BufRead + Send,
    W: Write,
    F: Fn(&mut RefinementOracle, &AdjacencyMatrix) -> Result<AdjacencyMatrix, OracleError>
        + Sync,
{
    let mut sink = Sink::new(output);
    run_batches(settings, input, &mut sink, |lines| {
        lines
            .par_iter()
            .map_init(RefinementOracle::new, |oracle, line: &Line| {
                match line.decode() {
                    Err(err) => Outcome::Rejected(err),
                    Ok(key) => match relabel(oracle, &key.unpack()) {
                        Ok(matrix) => Outcome::Write(PackedKey::pack(&matrix)),
                        Err(err) => Outcome::Failed(err),
                    },
                }
            })
            .collect()
    })?;
    info!("{} {}", component, sink.statistics().summary());
    sink.finish()
}
