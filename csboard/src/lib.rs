#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod board;
pub mod channel;
pub mod config;
pub mod constants;
pub mod devices;
mod error;
pub mod mux;
pub mod polarity;
pub mod sampling;
pub mod schedule;
pub mod telemetry;

pub use board::{ControlBoard, dac_code};
pub use channel::{Channel, Module};
pub use config::{BOARD_1, BOARD_2, BoardConfig};
pub use error::Error;
pub use polarity::Polarity;
pub use sampling::Measurements;
pub use telemetry::Telemetry;
