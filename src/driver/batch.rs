// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Batched line input, the read/compute pipeline, and the output sink.

use super::statistics::{Counters, Statistics};
use super::Settings;
use crate::error::{DecodeError, DriverError, OracleError};
use crate::pack::{decode_text, encode_wire, PackedKey};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// One non-blank input line, without surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// 1-based position in the input.
    pub number: u64,
    pub text: Vec<u8>,
}

impl Line {
    pub fn decode(&self) -> Result<PackedKey, DecodeError> {
        decode_text(&self.text)
    }
}

/// Reads the input in fixed-size batches of lines.
pub struct BatchReader<R> {
    input: R,
    batch_lines: usize,
    lines_read: u64,
    buffer: Vec<u8>,
}

impl<R: BufRead> BatchReader<R> {
    pub fn new(input: R, batch_lines: usize) -> Self {
        BatchReader {
            input,
            batch_lines: batch_lines.max(1),
            lines_read: 0,
            buffer: Vec::new(),
        }
    }

    /// Up to `batch_lines` non-blank lines; empty at end of input.
    pub fn next_batch(&mut self) -> io::Result<Vec<Line>> {
        let mut batch = Vec::with_capacity(self.batch_lines.min(1 << 16));
        while batch.len() < self.batch_lines {
            self.buffer.clear();
            if self.input.read_until(b'\n', &mut self.buffer)? == 0 {
                break;
            }
            self.lines_read += 1;
            let text = trim(&self.buffer);
            if !text.is_empty() {
                batch.push(Line {
                    number: self.lines_read,
                    text: text.to_vec(),
                });
            }
        }
        Ok(batch)
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// What to do with one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Write(PackedKey),
    Rejected(DecodeError),
    /// Dropped for the given reason.
    Skipped(Counters),
    Failed(OracleError),
}

/// Writes accepted keys as wire lines and keeps the run's counters.
pub struct Sink<W: Write> {
    output: W,
    stats: Statistics,
}

impl<W: Write> Sink<W> {
    pub fn new(output: W) -> Self {
        Sink {
            output,
            stats: Statistics::new(),
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn count(&mut self, counter: Counters) {
        self.stats.increment_counter(counter);
    }

    pub fn record(&mut self, line: &Line, outcome: Outcome) -> Result<(), DriverError> {
        self.count(Counters::LinesRead);
        match outcome {
            Outcome::Write(key) => {
                let text = encode_wire(&key);
                self.output.write_all(text.as_bytes())?;
                self.output.write_all(b"\n")?;
                self.count(Counters::Representatives);
            }
            Outcome::Rejected(err) => {
                warn!(
                    "[Input] line {}: rejected {:?}: {}",
                    line.number,
                    String::from_utf8_lossy(&line.text),
                    err
                );
                self.count(Counters::Rejected);
            }
            Outcome::Skipped(counter) => self.count(counter),
            Outcome::Failed(source) => {
                return Err(DriverError::Cyclic {
                    line: line.number,
                    source,
                })
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Statistics, DriverError> {
        self.output.flush()?;
        Ok(self.stats)
    }
}

/// Run `process` over the input one batch at a time on the settings'
/// thread pool, reading the next batch while the current one is
/// processed. Results reach `sink` in input order.
///
/// `process` must return exactly one outcome per line.
pub fn run_batches<R, W, P>(
    settings: &Settings,
    input: R,
    sink: &mut Sink<W>,
    process: P,
) -> Result<(), DriverError>
where
    R: BufRead + Send,
    W: Write,
    P: Fn(&[Line]) -> Vec<Outcome> + Sync,
{
    let pool = settings.thread_pool()?;
    debug!(
        "[Batch] {} threads, {} lines per batch",
        pool.current_num_threads(),
        settings.batch_lines
    );
    let mut reader = BatchReader::new(input, settings.batch_lines);
    let mut current = reader.next_batch()?;
    let mut batch_number = 0u64;
    while !current.is_empty() {
        batch_number += 1;
        debug!(
            "[Batch] processing batch {} ({} lines); {} written so far",
            batch_number,
            current.len(),
            sink.statistics().get(Counters::Representatives)
        );
        let (outcomes, next) =
            pool.install(|| rayon::join(|| process(&current), || reader.next_batch()));
        debug_assert_eq!(outcomes.len(), current.len());
        for (line, outcome) in current.iter().zip(outcomes) {
            sink.record(line, outcome)?;
        }
        current = next?;
    }
    Ok(())
}
