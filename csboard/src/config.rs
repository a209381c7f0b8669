//! Per-unit board configuration.
//!
//! The channel wiring is fixed by the PCB (see [`crate::channel`]), but each
//! physical unit is calibrated separately. Load the values for a unit once at
//! start-up and hand them to [`ControlBoard::new`].
//!
//! [`ControlBoard::new`]: crate::ControlBoard::new

use crate::channel::Channel;
use crate::constants::{ADC_ADDRESS, CHANNEL_COUNT, DAC_ADDRESS, EXPANDER_ADDRESS, MUX_ADDRESS};

/// Board-specific addresses and calibration constants.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Address of the TCA9548A bus multiplexer.
    pub mux_address: u8,
    /// Address of the DAC7578, on the upstream bus segment.
    pub dac_address: u8,
    /// Address of each module's MCP23008.
    pub expander_address: u8,
    /// Address of each module's ADS7828.
    pub adc_address: u8,
    /// Additive correction applied to each channel's current readout, in mA.
    ///
    /// Calibrate against a 1 kΩ load.
    pub calibration_offsets_ma: [f32; CHANNEL_COUNT],
    /// Telemetry reports a current of exactly zero when the channel's voltage
    /// magnitude is below this value (V), as the output is treated as
    /// disconnected.
    pub mute_threshold_v: f32,
    /// DAC counts per mA of requested output current.
    pub dac_counts_per_ma: f32,
}

impl BoardConfig {
    /// Calibration offset for the given channel, in mA.
    pub fn calibration_offset(&self, channel: Channel) -> f32 {
        self.calibration_offsets_ma[channel.index() as usize]
    }

    /// Replace the calibration offsets, keeping everything else.
    pub fn with_calibration_offsets(mut self, offsets_ma: [f32; CHANNEL_COUNT]) -> Self {
        self.calibration_offsets_ma = offsets_ma;
        self
    }

    /// Replace the telemetry mute threshold, keeping everything else.
    pub fn with_mute_threshold(mut self, threshold_v: f32) -> Self {
        self.mute_threshold_v = threshold_v;
        self
    }
}

/// Calibration of board #1.
pub const BOARD_1: BoardConfig = BoardConfig {
    mux_address: MUX_ADDRESS,
    dac_address: DAC_ADDRESS,
    expander_address: EXPANDER_ADDRESS,
    adc_address: ADC_ADDRESS,
    calibration_offsets_ma: [0.03, -0.13, 0.02, -0.13, 0.06, -0.13, 0.08, -0.13],
    mute_threshold_v: 0.08,
    dac_counts_per_ma: 200.0,
};

/// Calibration of board #2.
pub const BOARD_2: BoardConfig = BoardConfig {
    calibration_offsets_ma: [0.12, -0.03, 0.12, -0.02, 0.12, -0.02, 0.11, -0.02],
    ..BOARD_1
};

impl Default for BoardConfig {
    fn default() -> Self {
        BOARD_1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boards_differ_only_in_calibration() {
        let two = BOARD_2.clone().with_calibration_offsets(BOARD_1.calibration_offsets_ma);
        assert_eq!(two, BOARD_1);
    }

    #[test]
    fn calibration_offset_lookup() {
        let ch = Channel::new(1).unwrap();
        assert_eq!(BOARD_1.calibration_offset(ch), -0.13);
        assert_eq!(BOARD_2.calibration_offset(ch), -0.03);
    }
}
