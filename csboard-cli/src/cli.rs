use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueEnum};
use csboard::constants::CHANNEL_COUNT;
use csboard::{BOARD_1, BOARD_2, BoardConfig};

use crate::util;

/// CLI for the 8-channel precision current-source board
///
/// Schedules are single-line commands of the form
///
///   PGM::<N>::<t_0> ... <t_{N-1}> <8 currents for row 0> ... <row N-1>
///
/// with currents in mA. The decode command checks a schedule without any
/// hardware, simulate plays it against a model of the board, and send
/// passes it to the board's controller over a serial port and prints the
/// telemetry that comes back.
#[derive(Debug, Parser)]
#[command(version, about, verbatim_doc_comment)]
pub(crate) struct Cli {
    /// Log more (-v for debug, -vv for trace). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Parser)]
pub(crate) enum Commands {
    /// Validate a schedule command and print it as a table.
    Decode(DecodeArgs),
    /// Play a schedule against a simulated board.
    Simulate(SimulateArgs),
    /// Send a schedule to the board and print its telemetry.
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ScheduleArgs {
    /// Schedule command, starting with PGM::
    pub(crate) command: String,
    /// Number of schedule rows the receiver can hold.
    #[arg(long, default_value_t = 100)]
    pub(crate) capacity: usize,
}

#[derive(Debug, Args)]
pub(crate) struct DecodeArgs {
    #[command(flatten)]
    pub(crate) schedule: ScheduleArgs,
}

#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    #[command(flatten)]
    pub(crate) schedule: ScheduleArgs,
    #[command(flatten)]
    pub(crate) board: BoardArgs,
    /// Load resistance on every channel, in kΩ.
    #[arg(long, default_value_t = 1.0, value_parser = util::positive_f32)]
    pub(crate) load_kohm: f32,
}

#[derive(Debug, Args)]
pub(crate) struct SendArgs {
    #[command(flatten)]
    pub(crate) schedule: ScheduleArgs,
    /// Serial port the board's controller is attached to.
    #[arg(short, long)]
    pub(crate) port: PathBuf,
    /// Serial baud rate.
    #[arg(short, long, default_value_t = 115_200)]
    pub(crate) baud: u32,
    /// Number of telemetry lines to print before exiting.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub(crate) lines: usize,
    /// Seconds to wait for each line.
    #[arg(long, default_value_t = 5)]
    pub(crate) timeout: u64,
}

/// Calibrated unit.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum BoardPreset {
    /// Board #1.
    #[value(name = "1", alias = "board-1")]
    One,
    /// Board #2.
    #[value(name = "2", alias = "board-2")]
    Two,
}

#[derive(Debug, Args)]
pub(crate) struct BoardArgs {
    /// Calibration preset of the board.
    #[arg(long, default_value = "1")]
    pub(crate) board: BoardPreset,
    /// Comma-separated current offsets for channels 0-7, in mA.
    ///
    /// Replaces the preset's offsets.
    #[arg(long, value_parser = util::offsets, allow_hyphen_values = true)]
    pub(crate) offsets: Option<[f32; CHANNEL_COUNT]>,
    /// Voltage magnitude (V) below which reported currents are muted.
    #[arg(long)]
    pub(crate) mute_threshold: Option<f32>,
}

impl BoardArgs {
    pub(crate) fn config(&self) -> BoardConfig {
        let mut config = match self.board {
            BoardPreset::One => BOARD_1,
            BoardPreset::Two => BOARD_2,
        };
        if let Some(offsets) = self.offsets {
            config = config.with_calibration_offsets(offsets);
        }
        if let Some(threshold) = self.mute_threshold {
            config = config.with_mute_threshold(threshold);
        }
        config
    }
}
