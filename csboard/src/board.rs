use embedded_hal::i2c::I2c;

use crate::Error;
use crate::channel::{Channel, Module};
use crate::config::BoardConfig;
use crate::constants::{
    ADC_INPUTS_PER_MODULE, ADC_PASSES, CHANNEL_COUNT, DAC_MAX_CODE, MODULE_COUNT,
};
use crate::devices::{Ads7828, Dac7578, Mcp23008, PowerDown};
use crate::mux::BusMux;
use crate::polarity::Polarity;
use crate::sampling::{Accumulator, Measurements, ModuleSample, RawModuleReadings};

/// Highest ADS7828 input index.
const MAX_ADC_INPUT: u8 = 7;

/// Driver for the 8-channel current-source board.
///
/// # Quick start
///
/// Hand the board's I2C bus and the unit's [`BoardConfig`] to
/// [`ControlBoard::new`], then call [`ControlBoard::begin`] once to put the
/// ADCs and I/O expanders into their working state.
///
/// After that an external control loop drives the board at its own cadence:
///
/// - [`ControlBoard::set_current`] to change a channel's output,
/// - [`ControlBoard::update_all`] to take a fresh set of readings, and
/// - [`ControlBoard::measurements`] (or [`Telemetry`]) to report them.
///
/// [`Telemetry`]: crate::telemetry::Telemetry
///
/// # Bus segments
///
/// The DAC sits on the upstream bus. Each module's ADC and expander sit
/// behind one line of the TCA9548A multiplexer. Every method that talks to a
/// module selects that module's line immediately before its transactions, so
/// there is no selection state for callers to keep track of.
#[derive(Debug)]
pub struct ControlBoard<I2C> {
    i2c: I2C,
    config: BoardConfig,
    mux: BusMux,
    dac: Dac7578,
    expander: Mcp23008,
    adcs: [Ads7828; MODULE_COUNT],
    measurements: Measurements,
    current_commands: [f32; CHANNEL_COUNT],
    raw_adc: [RawModuleReadings; MODULE_COUNT],
}

impl<I2C: I2c> ControlBoard<I2C> {
    ////////////////////////////////////////////////////////////////////////////////
    // Construction
    ////////////////////////////////////////////////////////////////////////////////

    /// Take ownership of the bus. No transactions are issued.
    pub fn new(i2c: I2C, config: BoardConfig) -> Self {
        Self {
            i2c,
            mux: BusMux::new(config.mux_address),
            dac: Dac7578::new(config.dac_address),
            expander: Mcp23008::new(config.expander_address),
            adcs: [Ads7828::new(config.adc_address); MODULE_COUNT],
            config,
            measurements: Measurements::default(),
            current_commands: [0.0; CHANNEL_COUNT],
            raw_adc: [[0; ADC_INPUTS_PER_MODULE]; MODULE_COUNT],
        }
    }

    /// Bring every module into its working state.
    ///
    /// For each module this enables the ADC's internal reference and drives
    /// every expander pin low as an output, which leaves all channels
    /// [`Polarity::Off`]. Runtime state is cleared.
    ///
    /// The DAC needs no initialization. Its outputs keep whatever value they
    /// held; with all switches open they carry no current.
    pub fn begin(&mut self) -> Result<(), Error<I2C::Error>> {
        for module in Module::all() {
            self.mux.select(&mut self.i2c, module.mux_line())?;
            self.adcs[module.index()].set_power_down(PowerDown::IrefOnAdOn);
            self.expander.init_all_outputs_low(&mut self.i2c)?;
        }
        self.measurements = Measurements::default();
        self.current_commands = [0.0; CHANNEL_COUNT];
        self.raw_adc = [[0; ADC_INPUTS_PER_MODULE]; MODULE_COUNT];
        tracing::debug!(
            mux = self.mux.address(),
            dac = self.dac.address(),
            expander = self.expander.address(),
            adc = self.adcs[0].address(),
            "board initialised"
        );
        Ok(())
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Configuration the board was created with.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Output
    ////////////////////////////////////////////////////////////////////////////////

    /// Drive `channel` with `current_ma` milliamps.
    ///
    /// The sign selects the switch/mux polarity (zero switches the channel
    /// off), and the magnitude is written to the channel's DAC output as
    /// `round(|current_ma| * counts_per_ma)`, saturating at full scale.
    ///
    /// A channel outside `0..=7` returns [`Error::ChannelOutOfRange`] without
    /// any bus traffic and without changing any state.
    pub fn set_current(&mut self, channel: u8, current_ma: f32) -> Result<(), Error<I2C::Error>> {
        let channel = Channel::try_from(channel).map_err(Error::ChannelOutOfRange)?;
        tracing::debug!(%channel, current_ma, "set current");
        self.current_commands[channel.index() as usize] = current_ma;
        self.set_polarity(channel, Polarity::from_current(current_ma))?;
        let code = dac_code(current_ma, self.config.dac_counts_per_ma);
        self.dac
            .write_and_update(&mut self.i2c, channel.dac_subchannel(), code)?;
        Ok(())
    }

    /// Drive the four switch/mux pins of `channel` into `polarity`.
    ///
    /// The pins are written one at a time in the order SWP, SWN, MUXP, MUXN.
    /// This does not change the DAC output or the recorded current command.
    pub fn set_polarity(
        &mut self,
        channel: Channel,
        polarity: Polarity,
    ) -> Result<(), Error<I2C::Error>> {
        self.mux.select(&mut self.i2c, channel.module().mux_line())?;
        for (pin, level) in polarity.pin_writes(channel.switch_pins()) {
            self.expander.digital_write(&mut self.i2c, pin, level)?;
        }
        Ok(())
    }

    /// Read back the polarity of `channel` from its expander.
    ///
    /// Returns `Ok(None)` if the pins hold a combination that no polarity
    /// produces, which can only happen if something else wrote the expander.
    pub fn polarity(&mut self, channel: Channel) -> Result<Option<Polarity>, Error<I2C::Error>> {
        self.mux.select(&mut self.i2c, channel.module().mux_line())?;
        let latch = self.expander.output_latch(&mut self.i2c)?;
        Ok(Polarity::from_latch(latch, channel.switch_pins()))
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Input
    ////////////////////////////////////////////////////////////////////////////////

    /// Take one raw reading of ADC `input` (0-7) on `module` (1-4).
    pub fn read_adc(&mut self, module: u8, input: u8) -> Result<u16, Error<I2C::Error>> {
        let module = Module::new(module).ok_or(Error::ModuleOutOfRange(module))?;
        if input > MAX_ADC_INPUT {
            return Err(Error::AdcChannelOutOfRange(input));
        }
        self.mux.select(&mut self.i2c, module.mux_line())?;
        Ok(self.adcs[module.index()].read(&mut self.i2c, input)?)
    }

    /// Sample every module and refresh all voltages and currents.
    ///
    /// Each module's six inputs are read in [`ADC_PASSES`] interleaved passes
    /// and averaged before the two channels' values are derived. If a read
    /// fails the cycle stops there: modules already processed keep their new
    /// values and the rest keep their previous ones.
    pub fn update_all(&mut self) -> Result<(), Error<I2C::Error>> {
        for module in Module::all() {
            self.mux.select(&mut self.i2c, module.mux_line())?;
            let adc = self.adcs[module.index()];
            let mut acc = Accumulator::default();
            for _ in 0..ADC_PASSES {
                for input in 0..ADC_INPUTS_PER_MODULE {
                    acc.add(input, adc.read(&mut self.i2c, input as u8)?);
                }
                acc.end_pass();
            }
            let raw = acc.average();
            let offsets = module
                .channels()
                .map(|ch| self.config.calibration_offset(ch));
            let sample = ModuleSample::derive(&raw, offsets);
            self.raw_adc[module.index()] = raw;
            self.measurements.store(module.index(), sample);
            tracing::trace!(module = module.number(), ?raw, "module sampled");
        }
        tracing::debug!(voltages = ?self.measurements.voltages, "sampling cycle complete");
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Runtime state
    ////////////////////////////////////////////////////////////////////////////////

    /// Latest derived voltages and currents.
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Latest channel voltages, in V.
    pub fn voltages(&self) -> &[f32; CHANNEL_COUNT] {
        &self.measurements.voltages
    }

    /// Latest channel currents, in mA.
    pub fn currents(&self) -> &[f32; CHANNEL_COUNT] {
        &self.measurements.currents
    }

    /// Last current requested for each channel, in mA.
    pub fn current_commands(&self) -> &[f32; CHANNEL_COUNT] {
        &self.current_commands
    }

    /// Averaged raw readings from the last sampling cycle, one row per module.
    pub fn raw_adc(&self) -> &[RawModuleReadings; MODULE_COUNT] {
        &self.raw_adc
    }
}

/// DAC code for a requested current: `round(|current_ma| * counts_per_ma)`.
///
/// Saturates at the 12-bit full scale.
pub fn dac_code(current_ma: f32, counts_per_ma: f32) -> u16 {
    let code = (current_ma.abs() * counts_per_ma).round();
    if code > f32::from(DAC_MAX_CODE) {
        tracing::warn!(current_ma, "requested current exceeds DAC full scale");
        DAC_MAX_CODE
    } else {
        // NaN casts to 0.
        code as u16
    }
}
