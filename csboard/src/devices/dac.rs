//! DAC7578 8-channel, 12-bit DAC.
//!
//! # Datasheet
//!
//! See the "DAC7578 Command and Access Byte" table for the command layout.
//! Data is left-aligned in the two bytes following the command byte.

use embedded_hal::i2c::I2c;

use crate::constants::DAC_MAX_CODE;

/// Command nibble: write to the input register and update the output.
const WRITE_AND_UPDATE: u8 = 0x30;

/// DAC7578 at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dac7578 {
    address: u8,
}

impl Dac7578 {
    /// DAC at the given 7-bit address.
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Address the DAC responds to.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Write `code` to output `subchannel` and update it immediately.
    ///
    /// Codes above 4095 are clamped.
    pub fn write_and_update<I: I2c>(
        &self,
        i2c: &mut I,
        subchannel: u8,
        code: u16,
    ) -> Result<(), I::Error> {
        tracing::trace!(subchannel, code, "dac write and update");
        i2c.write(self.address, &encode(WRITE_AND_UPDATE, subchannel, code))
    }
}

/// Build the three bytes of a DAC command.
fn encode(command: u8, subchannel: u8, code: u16) -> [u8; 3] {
    let [msb, lsb] = (code.min(DAC_MAX_CODE) << 4).to_be_bytes();
    [command | (subchannel & 0x0F), msb, lsb]
}
