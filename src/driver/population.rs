// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Population: one representative per orbit, in input order.
//!
//! Runs on a single thread. Concurrent population is only exact for
//! racing candidates with the same canonical key, so the input is
//! consumed strictly in order.

use super::batch::{BatchReader, Outcome, Sink};
use super::statistics::{Counters, Statistics};
use super::{Representative, Settings};
use crate::canon::RefinementOracle;
use crate::error::DriverError;
use crate::keyset::ShardedKeySet;
use crate::orbit::{Emission, OrbitEngine, Population};
use crate::pack::PackedKey;
use std::io::{BufRead, Write};
use tracing::{debug, info};

pub fn populate_stream<R, W>(
    settings: &Settings,
    input: R,
    output: W,
) -> Result<Statistics, DriverError>
where
    R: BufRead,
    W: Write,
{
    let global = ShardedKeySet::new(settings.shards);
    if settings.reserve > 0 {
        global.reserve(settings.reserve);
    }
    let mut engine = OrbitEngine::with_limits(RefinementOracle::new(), settings.limits());
    let mut sink = Sink::new(output);
    let mut reader = BatchReader::new(input, settings.batch_lines);

    loop {
        let batch = reader.next_batch()?;
        if batch.is_empty() {
            break;
        }
        for line in &batch {
            let outcome = match line.decode() {
                Err(err) => Outcome::Rejected(err),
                Ok(candidate) => match engine.populate(&global, candidate) {
                    Population::Absorbed => Outcome::Skipped(Counters::Absorbed),
                    Population::Emitted(emission) => {
                        if !emission.complete {
                            sink.count(Counters::Truncated);
                        }
                        Outcome::Write(representative(settings.representative, &emission))
                    }
                },
            };
            sink.record(line, outcome)?;
        }
        debug!(
            "[Populate] {} keys recorded after {} lines",
            global.size(),
            sink.statistics().get(Counters::LinesRead)
        );
    }

    info!(
        "[Populate] {} keys recorded; {}",
        global.size(),
        sink.statistics().summary()
    );
    sink.finish()
}

fn representative(choice: Representative, emission: &Emission) -> PackedKey {
    match choice {
        Representative::Candidate => emission.candidate,
        Representative::Canonical => emission.canonical,
        Representative::OrbitMinimum => emission.orbit_minimum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::AdjacencyMatrix;
    use crate::pack::encode_text;
    use std::io::Cursor;

    fn populate(settings: &Settings, input: &str) -> (String, Statistics) {
        let mut output = Vec::new();
        let stats = populate_stream(settings, Cursor::new(input), &mut output).unwrap();
        (String::from_utf8(output).unwrap(), stats)
    }

    fn text(n: usize, edges: &[(usize, usize)]) -> String {
        encode_text(&PackedKey::pack(&AdjacencyMatrix::from_edges(n, edges).unwrap()))
    }

    #[test]
    fn test_isomorphic_lines_absorbed() {
        let a = text(3, &[(0, 1)]);
        let b = text(3, &[(2, 0)]);
        assert_eq!(a, "&BO?");
        assert_eq!(b, "&B?_");
        let (output, stats) = populate(&Settings::default(), &format!("{a}\n{b}\nnonsense\n"));
        assert_eq!(output, format!("{a}\n"));
        assert_eq!(stats.get(Counters::LinesRead), 3);
        assert_eq!(stats.get(Counters::Representatives), 1);
        assert_eq!(stats.get(Counters::Absorbed), 1);
        assert_eq!(stats.get(Counters::Rejected), 1);
    }

    #[test]
    fn test_minimum_representative_is_stable() {
        let settings = Settings {
            representative: Representative::OrbitMinimum,
            ..Settings::default()
        };
        let path = text(3, &[(0, 1), (1, 2)]);
        let (first, _) = populate(&settings, &path);
        let (second, _) = populate(&settings, first.trim());
        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 1);
    }

    #[test]
    fn test_canonical_representative() {
        let settings = Settings {
            representative: Representative::Canonical,
            ..Settings::default()
        };
        let a = text(3, &[(0, 1)]);
        let b = text(3, &[(2, 0)]);
        let (from_a, _) = populate(&settings, &a);
        let (from_b, _) = populate(&settings, &b);
        assert_eq!(from_a, from_b);
    }
}
