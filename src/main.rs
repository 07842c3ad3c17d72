// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use orbit_census::driver::options::{Invocation, Request, USAGE};
use orbit_census::driver::{self, Counters};
use orbit_census::error::DriverError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};

fn main() -> ExitCode {
    let invocation = match Invocation::parse(std::env::args().skip(1)) {
        Ok(Request::Run(invocation)) => invocation,
        Ok(Request::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("orbits: {}\n\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    let level = match invocation.verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    match run(&invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(invocation: &Invocation) -> Result<(), DriverError> {
    let command: &'static str = invocation.command.into();
    info!("[Main] {} with {:?}", command, invocation.settings);
    let start = Instant::now();

    let output: Box<dyn Write> = match &invocation.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let stats = match &invocation.input {
        Some(path) => driver::run(
            invocation.command,
            &invocation.settings,
            BufReader::new(File::open(path)?),
            output,
        )?,
        None => driver::run(
            invocation.command,
            &invocation.settings,
            BufReader::new(io::stdin()),
            output,
        )?,
    };

    info!(
        "[Main] {}: {} lines in, {} lines out in {:.2?}",
        command,
        stats.get(Counters::LinesRead),
        stats.get(Counters::Representatives),
        start.elapsed()
    );
    Ok(())
}
