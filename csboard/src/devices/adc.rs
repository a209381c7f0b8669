//! ADS7828 8-input, 12-bit ADC.
//!
//! # Datasheet
//!
//! See table 1 (command byte) and table 2 (channel selection control). A
//! conversion is started by writing the command byte and the 12-bit result
//! is read back right-aligned in two bytes, MSB first.

use bit_field::BitField;
use embedded_hal::i2c::I2c;

/// Power-down selection held in PD1/PD0 of every command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerDown {
    /// Power down between conversions.
    #[default]
    BetweenConversions,
    /// Internal reference off, converter on.
    IrefOffAdOn,
    /// Internal reference on, converter powered down between conversions.
    IrefOnAdOff,
    /// Internal reference and converter both on.
    IrefOnAdOn,
}

impl From<PowerDown> for u8 {
    fn from(value: PowerDown) -> Self {
        match value {
            PowerDown::BetweenConversions => 0b00,
            PowerDown::IrefOffAdOn => 0b01,
            PowerDown::IrefOnAdOff => 0b10,
            PowerDown::IrefOnAdOn => 0b11,
        }
    }
}

/// ADS7828 at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ads7828 {
    address: u8,
    power_down: PowerDown,
}

impl Ads7828 {
    /// ADC at the given 7-bit address, powering down between conversions.
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            power_down: PowerDown::BetweenConversions,
        }
    }

    /// Address the ADC responds to.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Power-down mode sent with each conversion.
    pub const fn power_down(&self) -> PowerDown {
        self.power_down
    }

    /// Change the power-down mode used from the next conversion on.
    ///
    /// The ADS7828 has no configuration register; the mode rides along in
    /// every command byte, so this does not touch the bus.
    pub fn set_power_down(&mut self, mode: PowerDown) {
        self.power_down = mode;
    }

    /// Perform one single-ended conversion of `input` (0-7).
    pub fn read<I: I2c>(&self, i2c: &mut I, input: u8) -> Result<u16, I::Error> {
        let mut buf = [0u8; 2];
        i2c.write_read(self.address, &[self.command_byte(input)], &mut buf)?;
        Ok(u16::from_be_bytes(buf) & 0x0FFF)
    }

    /// Command byte for a single-ended conversion of `input`.
    ///
    /// Single-ended inputs are selected by C2..C0 in the interleaved order
    /// of table 2: even inputs are `0b0xx`, odd inputs `0b1xx`.
    fn command_byte(&self, input: u8) -> u8 {
        let input = input & 0x07;
        let select = ((input & 0x01) << 2) | (input >> 1);
        let mut command = 0u8;
        command.set_bit(7, true);
        command.set_bits(4..7, select);
        command.set_bits(2..4, self.power_down.into());
        command
    }
}
