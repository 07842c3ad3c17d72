// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Command-line parsing for the `orbits` binary.

use super::{parse_scaled_size, Representative, Settings};
use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{EnumString, IntoStaticStr};

pub const USAGE: &str = "\
usage: orbits <command> [options]

commands:
  populate   emit one representative per orbit (global dedup, sequential)
  minimal    keep lines whose canonical key is the minimum of their orbit
  unique     drop lines already seen (by key, or by canonical key with -c)
  canon      replace every line by its canonical form
  upper      relabel every line along a topological order

options:
  -i FILE             read from FILE instead of stdin
  -o FILE             write to FILE instead of stdout
  -j N                worker threads (default: all cores)
  -n N                shards of the shared key set (default: 256)
  -l SIZE             lines per batch (default: 100k)
  -m SIZE             keys to reserve in the shared key set
  -u                  minimal: also drop repeated canonical keys
  -c                  unique: compare canonical forms
  --emit WHAT         candidate | canonical | minimum (default: candidate)
  --frontier-limit N  give up on orbits needing more than N queued matrices
  -v                  more logging (repeatable)
  -h, --help          show this message

SIZE accepts K/M/G suffixes (x1000) and Ki/Mi/Gi (x1024), e.g. 500k, 2Mi.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Populate,
    Minimal,
    Unique,
    Canon,
    Upper,
}

/// A fully parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub settings: Settings,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub verbosity: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Help,
    Run(Invocation),
}

impl Invocation {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Request, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut command = None;
        let mut settings = Settings::default();
        let mut input = None;
        let mut output = None;
        let mut verbosity = 0u8;

        while let Some(arg) = args.next() {
            if arg == "-h" || arg == "--help" {
                return Ok(Request::Help);
            }
            if let Some(long) = arg.strip_prefix("--") {
                let mut value = || args.next().ok_or_else(|| ConfigError::MissingValue(arg.clone()));
                match long {
                    "emit" => settings.representative = parse_representative(&value()?)?,
                    "frontier-limit" => {
                        settings.frontier_limit = Some(parse_size("--frontier-limit", &value()?)?)
                    }
                    _ => return Err(ConfigError::UnknownOption(arg.clone())),
                }
                continue;
            }
            let Some(short) = arg.strip_prefix('-').filter(|s| !s.is_empty()) else {
                if command.is_some() {
                    return Err(ConfigError::UnknownOption(arg.clone()));
                }
                command = Some(
                    Command::from_str(&arg).map_err(|_| ConfigError::UnknownCommand(arg.clone()))?,
                );
                continue;
            };

            let flag = short.chars().next().unwrap_or('-');
            let attached = &short[flag.len_utf8()..];
            if "ionljm".contains(flag) {
                let option = format!("-{}", flag);
                let value = if attached.is_empty() {
                    args.next()
                        .ok_or_else(|| ConfigError::MissingValue(option.clone()))?
                } else {
                    attached.to_string()
                };
                match flag {
                    'i' => input = Some(PathBuf::from(value)),
                    'o' => output = Some(PathBuf::from(value)),
                    'n' => settings.shards = parse_count(&option, &value)?,
                    'j' => settings.threads = parse_count(&option, &value)?,
                    'l' => {
                        settings.batch_lines = parse_size(&option, &value)?;
                        if settings.batch_lines == 0 {
                            return Err(invalid_value(&option, &value));
                        }
                    }
                    _ => settings.reserve = parse_size(&option, &value)?,
                }
                continue;
            }
            for c in short.chars() {
                match c {
                    'u' => settings.unique = true,
                    'c' => settings.canonicalize = true,
                    'v' => verbosity = verbosity.saturating_add(1),
                    'h' => return Ok(Request::Help),
                    _ => return Err(ConfigError::UnknownOption(format!("-{}", c))),
                }
            }
        }

        let command = command.ok_or(ConfigError::MissingCommand)?;
        Ok(Request::Run(Invocation {
            command,
            settings,
            input,
            output,
            verbosity,
        }))
    }
}

fn invalid_value(option: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}

fn parse_count(option: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| invalid_value(option, value))
}

fn parse_size(option: &str, value: &str) -> Result<usize, ConfigError> {
    parse_scaled_size(value).map_err(|_| invalid_value(option, value))
}

fn parse_representative(value: &str) -> Result<Representative, ConfigError> {
    match value {
        "candidate" => Ok(Representative::Candidate),
        "canonical" => Ok(Representative::Canonical),
        "minimum" => Ok(Representative::OrbitMinimum),
        _ => Err(invalid_value("--emit", value)),
    }
}
