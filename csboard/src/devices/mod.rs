//! Register-level drivers for the peripherals on the board.
//!
//! The drivers hold only addresses and configuration. They borrow the bus for
//! each call, so one bus can serve the upstream DAC and every module behind
//! the multiplexer.

pub mod adc;
pub mod dac;
pub mod expander;

pub use adc::{Ads7828, PowerDown};
pub use dac::Dac7578;
pub use expander::{Mcp23008, PinLevel};
