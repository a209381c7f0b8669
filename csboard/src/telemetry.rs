//! Fixed-field telemetry line.
//!
//! ```text
//! TIME::<power-on s>::PGMTime::<program s>::SMPL::<v0> ... <v7> <i0> ... <i7>
//! ```
//!
//! Times carry one decimal place, voltages (V) and currents (mA) three. A
//! channel whose voltage magnitude is below the mute threshold is treated as
//! disconnected and reports a current of exactly `0.000`.

use std::str::FromStr;
use std::time::Duration;

use crate::constants::CHANNEL_COUNT;
use crate::sampling::Measurements;

const TIME_TAG: &str = "TIME::";
const PROGRAM_TAG: &str = "::PGMTime::";
const SAMPLE_TAG: &str = "::SMPL::";

/// One telemetry report, rendered with [`Display`](std::fmt::Display).
///
/// The rendered line has no terminator; write it with `writeln!`.
#[derive(Debug, Clone, Copy)]
pub struct Telemetry<'a> {
    /// Time since power-on.
    pub power_on: Duration,
    /// Time since the current schedule started.
    pub program: Duration,
    /// Readings to report.
    pub measurements: &'a Measurements,
    /// Voltage magnitude (V) below which a channel's current is muted.
    pub mute_threshold_v: f32,
}

impl Telemetry<'_> {
    /// Current to report for channel `i`, after muting.
    pub fn reported_current(&self, i: usize) -> f32 {
        if self.measurements.voltages[i].abs() < self.mute_threshold_v {
            0.0
        } else {
            self.measurements.currents[i]
        }
    }
}

impl std::fmt::Display for Telemetry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{TIME_TAG}{:.1}{PROGRAM_TAG}{:.1}{SAMPLE_TAG}",
            self.power_on.as_secs_f32(),
            self.program.as_secs_f32(),
        )?;
        for v in &self.measurements.voltages {
            write!(f, "{v:.3} ")?;
        }
        for i in 0..CHANNEL_COUNT {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:.3}", self.reported_current(i))?;
        }
        Ok(())
    }
}

/// Problems parsing a telemetry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A field tag was missing or out of order.
    MissingTag(&'static str),
    /// A number could not be parsed.
    InvalidNumber(String),
    /// The sample section did not hold exactly 16 values.
    WrongSampleCount(usize),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingTag(tag) => write!(f, "missing {tag:?} field"),
            ParseError::InvalidNumber(s) => write!(f, "{s:?} is not a number"),
            ParseError::WrongSampleCount(n) => {
                write!(f, "expected {} samples, found {n}", 2 * CHANNEL_COUNT)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A telemetry line read back by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTelemetry {
    /// Seconds since power-on.
    pub power_on_s: f32,
    /// Seconds since the schedule started.
    pub program_s: f32,
    /// Channel voltages, in V.
    pub voltages: [f32; CHANNEL_COUNT],
    /// Channel currents as reported (muted channels read zero), in mA.
    pub currents: [f32; CHANNEL_COUNT],
}

fn number(s: &str) -> Result<f32, ParseError> {
    s.trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber(s.to_owned()))
}

impl FromStr for ParsedTelemetry {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let rest = line
            .trim()
            .strip_prefix(TIME_TAG)
            .ok_or(ParseError::MissingTag(TIME_TAG))?;
        let (power_on, rest) = rest
            .split_once(PROGRAM_TAG)
            .ok_or(ParseError::MissingTag(PROGRAM_TAG))?;
        let (program, samples) = rest
            .split_once(SAMPLE_TAG)
            .ok_or(ParseError::MissingTag(SAMPLE_TAG))?;

        let values = samples
            .split_whitespace()
            .map(number)
            .collect::<Result<Vec<f32>, _>>()?;
        if values.len() != 2 * CHANNEL_COUNT {
            return Err(ParseError::WrongSampleCount(values.len()));
        }
        let (voltages, currents) = values.split_at(CHANNEL_COUNT);

        Ok(Self {
            power_on_s: number(power_on)?,
            program_s: number(program)?,
            voltages: std::array::from_fn(|i| voltages[i]),
            currents: std::array::from_fn(|i| currents[i]),
        })
    }
}
