//! In-process model of the board, behind an [`I2c`] implementation.
//!
//! The model answers the same addresses as the real hardware and keeps the
//! state the driver relies on: the multiplexer's selected line, the DAC
//! output codes, each module's expander registers and ADC command. Each
//! channel drives a resistive load, so voltage is `I * R`, clamped at the
//! compliance limit.
//!
//! The current-sense path reads low by the channel's calibration offset, so
//! a calibrated readout recovers the programmed current.

use csboard::constants::{
    ADC_FULL_SCALE, ADC_REFERENCE_V, CHANNEL_COUNT, MODULE_COUNT, SENSE_GAIN,
};
use csboard::{BoardConfig, Channel, Module, Polarity};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// Largest output voltage magnitude the channels can drive, in V.
pub(crate) const COMPLIANCE_V: f32 = 20.0;

const IODIR: u8 = 0x00;
const GPIO: u8 = 0x09;
const OLAT: u8 = 0x0A;

const DAC_WRITE_AND_UPDATE: u8 = 0x3;

const ADC_MAX_COUNT: f32 = 4095.0;

#[derive(Debug, Clone, Copy)]
struct SimModule {
    iodir: u8,
    olat: u8,
    pointer: u8,
    adc_command: u8,
}

impl SimModule {
    /// Power-on register state: every expander pin an input.
    const RESET: Self = Self {
        iodir: 0xFF,
        olat: 0x00,
        pointer: 0x00,
        adc_command: 0x00,
    };

    /// Pins actually driven by the expander.
    fn driven_latch(&self) -> u8 {
        self.olat & !self.iodir
    }
}

/// Simulated board bus.
#[derive(Debug, Clone)]
pub(crate) struct SimBus {
    config: BoardConfig,
    load_kohm: f32,
    selected: Option<u8>,
    dac_codes: [u16; CHANNEL_COUNT],
    modules: [SimModule; MODULE_COUNT],
}

fn nack() -> ErrorKind {
    ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
}

/// ADC counts for a sensed quantity, saturating at the converter's range.
fn to_counts(value: f32) -> u16 {
    let counts = (value / (ADC_REFERENCE_V * SENSE_GAIN) * ADC_FULL_SCALE).round();
    counts.clamp(0.0, ADC_MAX_COUNT) as u16
}

impl SimBus {
    /// A freshly powered board with every channel driving `load_kohm`.
    pub(crate) fn new(config: &BoardConfig, load_kohm: f32) -> Self {
        Self {
            config: config.clone(),
            load_kohm,
            selected: None,
            dac_codes: [0; CHANNEL_COUNT],
            modules: [SimModule::RESET; MODULE_COUNT],
        }
    }

    /// Output (mA, V) of `channel` given the present DAC and switch state.
    pub(crate) fn output(&self, channel: Channel) -> (f32, f32) {
        let module = &self.modules[channel.module().index()];
        let code = self.dac_codes[usize::from(channel.dac_subchannel())];
        let magnitude = f32::from(code) / self.config.dac_counts_per_ma;
        let current = match Polarity::from_latch(module.driven_latch(), channel.switch_pins()) {
            Some(Polarity::Positive) => magnitude,
            Some(Polarity::Negative) => -magnitude,
            Some(Polarity::Off) | None => 0.0,
        };
        let voltage = current * self.load_kohm;
        if voltage.abs() > COMPLIANCE_V {
            let voltage = COMPLIANCE_V.copysign(voltage);
            (voltage / self.load_kohm, voltage)
        } else {
            (current, voltage)
        }
    }

    fn selected_module(&self) -> Result<Module, ErrorKind> {
        self.selected.and_then(Module::new).ok_or_else(nack)
    }

    /// Result of converting ADC `input` on `module`.
    fn conversion(&self, module: Module, input: u8) -> u16 {
        let command = self.modules[module.index()].adc_command;
        // No external reference is fitted.
        if command & 0b0000_1000 == 0 {
            return 0;
        }
        let pair = match input {
            0 | 2 | 3 => 0,
            1 | 4 | 5 => 1,
            _ => return 0,
        };
        let channel = module.channels()[pair];
        let (current, voltage) = self.output(channel);
        match input {
            0 | 1 => {
                let offset = self.config.calibration_offset(channel);
                to_counts(current.abs() - offset)
            }
            2 | 4 => to_counts(voltage.max(0.0)),
            3 | 5 => to_counts((-voltage).max(0.0)),
            _ => 0,
        }
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        if address == self.config.mux_address {
            let &[mask] = bytes else {
                return Err(ErrorKind::Other);
            };
            self.selected = (mask != 0).then(|| mask.trailing_zeros() as u8);
        } else if address == self.config.dac_address {
            let &[command, msb, lsb] = bytes else {
                return Err(ErrorKind::Other);
            };
            let subchannel = usize::from(command & 0x0F);
            if command >> 4 == DAC_WRITE_AND_UPDATE && subchannel < CHANNEL_COUNT {
                self.dac_codes[subchannel] = u16::from_be_bytes([msb, lsb]) >> 4;
            }
        } else if address == self.config.expander_address {
            let module = self.selected_module()?;
            let state = &mut self.modules[module.index()];
            let Some((&register, data)) = bytes.split_first() else {
                return Ok(());
            };
            state.pointer = register;
            if let Some(&value) = data.first() {
                match register {
                    IODIR => state.iodir = value,
                    GPIO | OLAT => state.olat = value,
                    _ => {}
                }
            }
        } else if address == self.config.adc_address {
            let module = self.selected_module()?;
            if let Some(&command) = bytes.first() {
                self.modules[module.index()].adc_command = command;
            }
        } else {
            return Err(nack());
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), ErrorKind> {
        if address == self.config.expander_address {
            let module = self.selected_module()?;
            let state = &self.modules[module.index()];
            let value = match state.pointer {
                IODIR => state.iodir,
                GPIO => state.driven_latch(),
                OLAT => state.olat,
                _ => 0,
            };
            buffer.fill(value);
        } else if address == self.config.adc_address {
            let module = self.selected_module()?;
            let select = (self.modules[module.index()].adc_command >> 4) & 0x07;
            let input = ((select & 0b011) << 1) | (select >> 2);
            let bytes = self.conversion(module, input).to_be_bytes();
            for (dst, src) in buffer.iter_mut().zip(bytes) {
                *dst = src;
            }
        } else {
            return Err(nack());
        }
        Ok(())
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.write(address, bytes)?,
                Operation::Read(buffer) => self.read(address, buffer)?,
            }
        }
        Ok(())
    }
}
