//! MCP23008 8-bit I/O expander.
//!
//! Only the output side is used: every pin drives an analog switch or a
//! multiplexer select line.
//!
//! # Datasheet
//!
//! See table 1-3 (register addresses) and section 1.6 for IODIR and OLAT.

use bit_field::BitField;
use embedded_hal::i2c::I2c;

/// I/O direction register. A 0 bit makes the pin an output.
const IODIR: u8 = 0x00;
/// Output latch register.
const OLAT: u8 = 0x0A;

/// Logic level driven on an expander pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic 1.
    High,
    /// Logic 0.
    Low,
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}

impl From<PinLevel> for bool {
    fn from(value: PinLevel) -> Self {
        matches!(value, PinLevel::High)
    }
}

/// MCP23008 at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mcp23008 {
    address: u8,
}

impl Mcp23008 {
    /// Expander at the given 7-bit address.
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Address the expander responds to.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Make every pin an output and drive it low.
    pub fn init_all_outputs_low<I: I2c>(&self, i2c: &mut I) -> Result<(), I::Error> {
        i2c.write(self.address, &[IODIR, 0x00])?;
        i2c.write(self.address, &[OLAT, 0x00])
    }

    /// Read the output latch.
    pub fn output_latch<I: I2c>(&self, i2c: &mut I) -> Result<u8, I::Error> {
        let mut buf = [0u8; 1];
        i2c.write_read(self.address, &[OLAT], &mut buf)?;
        Ok(buf[0])
    }

    /// Drive a single pin, leaving the others unchanged.
    ///
    /// This reads the output latch, changes the one bit and writes the latch
    /// back.
    pub fn digital_write<I: I2c>(
        &self,
        i2c: &mut I,
        pin: u8,
        level: PinLevel,
    ) -> Result<(), I::Error> {
        let mut latch = self.output_latch(i2c)?;
        latch.set_bit(usize::from(pin & 0x07), level.into());
        tracing::trace!(pin, ?level, latch, "expander write");
        i2c.write(self.address, &[OLAT, latch])
    }
}
