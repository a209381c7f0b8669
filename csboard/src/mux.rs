//! TCA9548A I2C bus multiplexer.
//!
//! The multiplexer has no per-transaction addressing: writing a line mask
//! connects that downstream segment to the bus until the next write. Module
//! operations on [`ControlBoard`] select their line immediately before every
//! transaction, so callers never handle the selection themselves.
//!
//! [`ControlBoard`]: crate::ControlBoard

use embedded_hal::i2c::I2c;

/// Highest downstream line of the TCA9548A.
pub const MAX_LINE: u8 = 7;

/// Bus multiplexer at a fixed address on the upstream bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusMux {
    address: u8,
}

impl BusMux {
    /// Multiplexer at the given 7-bit address.
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Address the multiplexer responds to.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Connect downstream line `line` (0-7) to the bus.
    ///
    /// Lines above 7 are silently ignored and produce no bus transaction.
    pub fn select<I: I2c>(&self, i2c: &mut I, line: u8) -> Result<(), I::Error> {
        if line > MAX_LINE {
            return Ok(());
        }
        tracing::trace!(line, "mux select");
        i2c.write(self.address, &[1 << line])
    }
}
