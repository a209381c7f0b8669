//! Fixed topology and device constants for the board.

/// Number of independently controllable channels.
pub const CHANNEL_COUNT: usize = 8;

/// Number of modules, each carrying one ADC and one I/O expander.
pub const MODULE_COUNT: usize = 4;

/// Channels per module.
pub const CHANNELS_PER_MODULE: usize = 2;

/// ADS7828 inputs sampled per module on every sampling cycle.
///
/// Inputs 0 and 1 are the current-sense outputs of the two channels, inputs
/// 2-3 and 4-5 are the differential voltage-sense pairs.
pub const ADC_INPUTS_PER_MODULE: usize = 6;

/// Repeated passes over the ADC inputs averaged into one reading.
pub const ADC_PASSES: usize = 5;

/// Default 7-bit address of the TCA9548A I2C multiplexer.
pub const MUX_ADDRESS: u8 = 0x70;

/// Default 7-bit address of the DAC7578 (on the upstream bus segment).
pub const DAC_ADDRESS: u8 = 0x47;

/// Default 7-bit address of each module's MCP23008 (behind the multiplexer).
pub const EXPANDER_ADDRESS: u8 = 0x20;

/// Default 7-bit address of each module's ADS7828 (behind the multiplexer).
pub const ADC_ADDRESS: u8 = 0x48;

/// Full-scale count of the 12-bit ADC used in the scaling formula.
pub const ADC_FULL_SCALE: f32 = 4096.0;

/// ADC internal reference voltage.
pub const ADC_REFERENCE_V: f32 = 2.5;

/// Gain between the ADC input and the measured quantity (V or mA).
pub const SENSE_GAIN: f32 = 10.0;

/// Highest code accepted by the 12-bit DAC.
pub const DAC_MAX_CODE: u16 = 0x0FFF;
