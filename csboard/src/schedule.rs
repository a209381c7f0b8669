//! Text command carrying a timed sequence of per-channel current setpoints.
//!
//! A schedule command is a single line:
//!
//! ```text
//! PGM::<N>::<t_0> ... <t_{N-1}> <c_0_0> ... <c_0_7> <c_1_0> ... <c_{N-1}_7>
//! ```
//!
//! `N` timestamps (unsigned integers, in whatever unit the playback loop
//! uses) are followed by `8N` currents in mA, row by row. The decoder writes
//! into storage owned by the caller and never allocates the schedule itself.
//!
//! ```
//! use csboard::schedule::decode_command;
//!
//! let mut times = [0u32; 4];
//! let mut currents = [[0f32; 8]; 4];
//! let n = decode_command(
//!     "PGM::1::250 1 0 0 0 0 0 0 -1",
//!     &mut times,
//!     &mut currents,
//! )
//! .unwrap();
//! assert_eq!(n, 1);
//! assert_eq!(times[0], 250);
//! assert_eq!(currents[0][7], -1.0);
//! ```

use crate::constants::CHANNEL_COUNT;

/// Prefix every schedule command starts with.
pub const PREFIX: &str = "PGM::";

/// Separator between the entry count and the payload.
pub const DELIMITER: &str = "::";

/// One row of setpoints, one per channel, in mA.
pub type SetpointRow = [f32; CHANNEL_COUNT];

/// Reasons a schedule command is rejected.
///
/// Every check runs before the caller's storage is written, so a rejected
/// command leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line does not start with `PGM::`.
    MissingPrefix,
    /// No `::` follows the entry count.
    MissingDelimiter,
    /// The entry count is not an integer.
    InvalidCount,
    /// The entry count is zero, negative, or larger than the storage.
    CountOutOfRange {
        /// Entry count given in the command.
        count: i64,
        /// Number of rows the caller's storage can hold.
        capacity: usize,
    },
    /// The payload holds fewer than `9N` tokens.
    NotEnoughTokens {
        /// Tokens required for the given entry count.
        expected: usize,
        /// Tokens present.
        found: usize,
    },
    /// A timestamp token is not an unsigned integer.
    InvalidTimestamp {
        /// Row of the offending timestamp.
        index: usize,
    },
    /// A current token is not a finite decimal number.
    InvalidCurrent {
        /// Row of the offending setpoint.
        row: usize,
        /// Channel of the offending setpoint.
        channel: usize,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MissingPrefix => write!(f, "command does not start with {PREFIX:?}"),
            DecodeError::MissingDelimiter => {
                write!(f, "no {DELIMITER:?} after the entry count")
            }
            DecodeError::InvalidCount => write!(f, "entry count is not an integer"),
            DecodeError::CountOutOfRange { count, capacity } => {
                write!(f, "entry count {count} is not in 1..={capacity}")
            }
            DecodeError::NotEnoughTokens { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            DecodeError::InvalidTimestamp { index } => {
                write!(f, "timestamp {index} is not an unsigned integer")
            }
            DecodeError::InvalidCurrent { row, channel } => {
                write!(f, "current for row {row}, channel {channel} is not a finite decimal number")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Zero the first `n` entries of both arrays.
///
/// `n` is clamped to the length of each array.
pub fn initialize_schedule(times: &mut [u32], currents: &mut [SetpointRow], n: usize) {
    let n_times = n.min(times.len());
    let n_rows = n.min(currents.len());
    times[..n_times].fill(0);
    currents[..n_rows].fill([0.0; CHANNEL_COUNT]);
}

/// Decode a schedule command into caller-owned storage.
///
/// The capacity is the shorter of the two slices. On success the first `N`
/// rows hold the decoded schedule, rows `N..capacity` are zeroed, and `N` is
/// returned. Tokens beyond the first `9N` are ignored.
pub fn decode_command(
    input: &str,
    times: &mut [u32],
    currents: &mut [SetpointRow],
) -> Result<usize, DecodeError> {
    let capacity = times.len().min(currents.len());

    let rest = input.strip_prefix(PREFIX).ok_or(DecodeError::MissingPrefix)?;
    let (count, payload) = rest
        .split_once(DELIMITER)
        .ok_or(DecodeError::MissingDelimiter)?;
    let count: i64 = count.trim().parse().map_err(|_| DecodeError::InvalidCount)?;
    let n = match usize::try_from(count) {
        Ok(n) if n >= 1 && n <= capacity => n,
        _ => return Err(DecodeError::CountOutOfRange { count, capacity }),
    };

    let tokens = tokenize(payload.trim());
    let expected = n + n * CHANNEL_COUNT;
    if tokens.len() < expected {
        return Err(DecodeError::NotEnoughTokens {
            expected,
            found: tokens.len(),
        });
    }

    let (time_tokens, current_tokens) = tokens.split_at(n);
    let parsed_times = time_tokens
        .iter()
        .enumerate()
        .map(|(index, t)| t.parse().map_err(|_| DecodeError::InvalidTimestamp { index }))
        .collect::<Result<Vec<u32>, _>>()?;
    let mut parsed_rows = vec![[0.0; CHANNEL_COUNT]; n];
    let chunks = current_tokens.chunks_exact(CHANNEL_COUNT);
    for (row_index, (row, chunk)) in parsed_rows.iter_mut().zip(chunks).enumerate() {
        for (channel, token) in chunk.iter().enumerate() {
            row[channel] = parse_current(token).ok_or(DecodeError::InvalidCurrent {
                row: row_index,
                channel,
            })?;
        }
    }

    times[..n].copy_from_slice(&parsed_times);
    currents[..n].copy_from_slice(&parsed_rows);
    initialize_schedule(&mut times[n..capacity], &mut currents[n..capacity], capacity - n);
    Ok(n)
}

/// Parse a plain decimal current such as `-2.5`.
///
/// Exponents, `inf` and `NaN` are rejected, as is anything that overflows
/// `f32`.
fn parse_current(token: &str) -> Option<f32> {
    let decimal = token
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'));
    let value: f32 = token.parse().ok()?;
    (decimal && value.is_finite()).then_some(value)
}

/// Split the payload into tokens.
///
/// A token ends at each space and at the final character of the payload.
/// Runs of spaces produce no empty tokens.
fn tokenize(payload: &str) -> Vec<&str> {
    let bytes = payload.as_bytes();
    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let last = i + 1 == bytes.len();
        if b == b' ' || last {
            let end = if b == b' ' { i } else { i + 1 };
            if start < end {
                tokens.push(&payload[start..end]);
            }
            start = i + 1;
        }
    }
    tokens
}

/// Render a schedule as a command line (without a line terminator).
///
/// Only the first `min(times.len(), currents.len())` entries are used.
pub fn encode_command(times: &[u32], currents: &[SetpointRow]) -> String {
    let n = times.len().min(currents.len());
    let mut out = format!("{PREFIX}{n}{DELIMITER}");
    let values = times[..n]
        .iter()
        .map(|t| t.to_string())
        .chain(currents[..n].iter().flatten().map(|c| c.to_string()));
    for (i, value) in values.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPACITY: usize = 10;

    fn storage() -> ([u32; CAPACITY], [SetpointRow; CAPACITY]) {
        ([0; CAPACITY], [[0.0; CHANNEL_COUNT]; CAPACITY])
    }

    #[test]
    fn decodes_two_row_command() {
        let (mut times, mut currents) = storage();
        let n = decode_command(
            "PGM::2::100 200 1.5 0 0 0 0 0 0 0 -2.5 0 0 0 0 0 0 0",
            &mut times,
            &mut currents,
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(times, [100, 200, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(currents[0], [1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(currents[1], [-2.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(currents[2..].iter().all(|row| *row == [0.0; CHANNEL_COUNT]));
    }

    #[test]
    fn zero_fills_stale_rows() {
        let mut times = [9; CAPACITY];
        let mut currents = [[9.0; CHANNEL_COUNT]; CAPACITY];
        decode_command("PGM::1::5 1 2 3 4 5 6 7 8", &mut times, &mut currents).unwrap();
        assert_eq!(times[0], 5);
        assert_eq!(currents[0], [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert!(times[1..].iter().all(|&t| t == 0));
        assert!(currents[1..].iter().all(|row| *row == [0.0; CHANNEL_COUNT]));
    }

    #[test]
    fn rejects_missing_prefix() {
        let (mut times, mut currents) = storage();
        let result = decode_command("PGX::1::0 0 0 0 0 0 0 0 0", &mut times, &mut currents);
        assert_eq!(result, Err(DecodeError::MissingPrefix));
    }

    #[test]
    fn rejects_missing_second_delimiter() {
        let (mut times, mut currents) = storage();
        let result = decode_command("PGM::1 0 0 0 0 0 0 0 0 0", &mut times, &mut currents);
        assert_eq!(result, Err(DecodeError::MissingDelimiter));
    }

    #[test]
    fn rejects_count_out_of_range() {
        let (mut times, mut currents) = storage();
        assert_eq!(
            decode_command("PGM::0::", &mut times, &mut currents),
            Err(DecodeError::CountOutOfRange { count: 0, capacity: CAPACITY })
        );
        assert_eq!(
            decode_command("PGM::-3::1 2 3", &mut times, &mut currents),
            Err(DecodeError::CountOutOfRange { count: -3, capacity: CAPACITY })
        );
        assert_eq!(
            decode_command("PGM::11::1", &mut times, &mut currents),
            Err(DecodeError::CountOutOfRange { count: 11, capacity: CAPACITY })
        );
    }

    #[test]
    fn rejects_non_numeric_count() {
        let (mut times, mut currents) = storage();
        let result = decode_command("PGM::two::1", &mut times, &mut currents);
        assert_eq!(result, Err(DecodeError::InvalidCount));
    }

    #[test]
    fn rejects_short_payload_without_writing() {
        let mut times = [7; CAPACITY];
        let mut currents = [[7.0; CHANNEL_COUNT]; CAPACITY];
        let result = decode_command("PGM::2::1 2 0 0 0 0 0 0 0 0", &mut times, &mut currents);
        assert_eq!(
            result,
            Err(DecodeError::NotEnoughTokens { expected: 18, found: 10 })
        );
        assert_eq!(times, [7; CAPACITY]);
        assert_eq!(currents, [[7.0; CHANNEL_COUNT]; CAPACITY]);
    }

    #[test]
    fn rejects_bad_tokens_without_writing() {
        let mut times = [7; CAPACITY];
        let mut currents = [[7.0; CHANNEL_COUNT]; CAPACITY];
        assert_eq!(
            decode_command("PGM::1::-5 0 0 0 0 0 0 0 0", &mut times, &mut currents),
            Err(DecodeError::InvalidTimestamp { index: 0 })
        );
        assert_eq!(
            decode_command("PGM::1::5 0 0 0 x 0 0 0 0", &mut times, &mut currents),
            Err(DecodeError::InvalidCurrent { row: 0, channel: 3 })
        );
        assert_eq!(
            decode_command("PGM::1::10 0 inf 0 0 0 0 0 0", &mut times, &mut currents),
            Err(DecodeError::InvalidCurrent { row: 0, channel: 1 })
        );
        assert_eq!(
            decode_command("PGM::1::10 0 0 NaN 0 0 0 0 0", &mut times, &mut currents),
            Err(DecodeError::InvalidCurrent { row: 0, channel: 2 })
        );
        assert_eq!(
            decode_command("PGM::1::10 1e3 0 0 0 0 0 0 0", &mut times, &mut currents),
            Err(DecodeError::InvalidCurrent { row: 0, channel: 0 })
        );
        assert_eq!(
            decode_command("PGM::1::10 0 0 0 0 0 0 0 -infinity", &mut times, &mut currents),
            Err(DecodeError::InvalidCurrent { row: 0, channel: 7 })
        );
        let huge = format!("PGM::1::10 {} 0 0 0 0 0 0 0", "9".repeat(50));
        assert_eq!(
            decode_command(&huge, &mut times, &mut currents),
            Err(DecodeError::InvalidCurrent { row: 0, channel: 0 })
        );
        assert_eq!(times, [7; CAPACITY]);
        assert_eq!(currents, [[7.0; CHANNEL_COUNT]; CAPACITY]);
    }

    #[test]
    fn tokenizer_collapses_space_runs_and_keeps_final_token() {
        assert_eq!(tokenize("1  2   3"), ["1", "2", "3"]);
        assert_eq!(tokenize("7"), ["7"]);
        assert_eq!(tokenize(""), Vec::<&str>::new());
        assert_eq!(tokenize("12 x"), ["12", "x"]);
    }

    #[test]
    fn surrounding_whitespace_and_extra_tokens_are_accepted() {
        let (mut times, mut currents) = storage();
        let n = decode_command(
            "PGM::1::  10 0 0 0 0 0 0 0 0.25 99 99 \r\n",
            &mut times,
            &mut currents,
        )
        .unwrap();
        assert_eq!(n, 1);
        assert_eq!(times[0], 10);
        assert_eq!(currents[0][7], 0.25);
        assert_eq!(times[1], 0);
    }

    #[test]
    fn capacity_is_shorter_slice() {
        let mut times = [0u32; 3];
        let mut currents = [[0.0; CHANNEL_COUNT]; 2];
        let line = "PGM::3::1 2 3 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        assert_eq!(
            decode_command(line, &mut times, &mut currents),
            Err(DecodeError::CountOutOfRange { count: 3, capacity: 2 })
        );
    }

    #[test]
    fn initialize_zeroes_prefix_only() {
        let mut times = [1u32; 4];
        let mut currents = [[1.0; CHANNEL_COUNT]; 4];
        initialize_schedule(&mut times, &mut currents, 2);
        assert_eq!(times, [0, 0, 1, 1]);
        assert_eq!(currents[1], [0.0; CHANNEL_COUNT]);
        assert_eq!(currents[2], [1.0; CHANNEL_COUNT]);
        initialize_schedule(&mut times, &mut currents, 100);
        assert_eq!(times, [0; 4]);
    }

    #[test]
    fn encode_matches_wire_format() {
        let line = encode_command(&[100, 200], &[[1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], [-2.5; 8]]);
        assert_eq!(
            line,
            "PGM::2::100 200 1.5 0 0 0 0 0 0 0 -2.5 -2.5 -2.5 -2.5 -2.5 -2.5 -2.5 -2.5"
        );
    }
}
