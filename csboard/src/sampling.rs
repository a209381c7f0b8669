//! Averaging and calibration of raw ADC readings.
//!
//! Each module's ADS7828 sees six inputs:
//!
//! | Input | Signal                                   |
//! |------:|------------------------------------------|
//! | 0     | current sense, first channel (magnitude) |
//! | 1     | current sense, second channel            |
//! | 2, 3  | voltage sense pair, first channel        |
//! | 4, 5  | voltage sense pair, second channel       |
//!
//! The current-sense inputs only report magnitude, so a channel's current
//! takes the sign of its differential voltage.

use crate::constants::{
    ADC_FULL_SCALE, ADC_INPUTS_PER_MODULE, ADC_PASSES, ADC_REFERENCE_V, CHANNEL_COUNT,
    CHANNELS_PER_MODULE, SENSE_GAIN,
};

/// Raw averaged readings of one module's six ADC inputs.
pub type RawModuleReadings = [u16; ADC_INPUTS_PER_MODULE];

/// Accumulates repeated passes over a module's ADC inputs.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Accumulator {
    sums: [f32; ADC_INPUTS_PER_MODULE],
    passes: usize,
}

impl Accumulator {
    /// Add one reading of `input` to its running sum.
    ///
    /// Inputs beyond the six sampled ones are ignored.
    pub(crate) fn add(&mut self, input: usize, reading: u16) {
        if let Some(sum) = self.sums.get_mut(input) {
            *sum += f32::from(reading);
        }
    }

    /// Mark the end of one pass over all inputs.
    pub(crate) fn end_pass(&mut self) {
        self.passes += 1;
    }

    /// Average of each input, rounded to the nearest count.
    ///
    /// Before any complete pass this falls back to dividing by the nominal
    /// [`ADC_PASSES`].
    pub(crate) fn average(&self) -> RawModuleReadings {
        let passes = if self.passes == 0 { ADC_PASSES } else { self.passes };
        self.sums.map(|sum| (sum / passes as f32).round() as u16)
    }
}

/// Scale an ADC count to the sensed quantity (V for voltage, mA for current).
pub fn counts_to_sense(counts: f32) -> f32 {
    counts / ADC_FULL_SCALE * ADC_REFERENCE_V * SENSE_GAIN
}

/// Differential voltage between a pair of inputs, in V.
pub fn differential_voltage(positive: u16, negative: u16) -> f32 {
    counts_to_sense(f32::from(positive) - f32::from(negative))
}

/// Calibrated current for a channel, in mA.
///
/// `offset_ma` is added to the sensed magnitude before the sign of the
/// paired voltage is applied.
pub fn calibrated_current(sense: u16, offset_ma: f32, voltage: f32) -> f32 {
    let sign = if voltage < 0.0 { -1.0 } else { 1.0 };
    sign * (counts_to_sense(f32::from(sense)) + offset_ma)
}

/// Voltages and currents derived for the two channels of one module.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModuleSample {
    /// Voltage of each channel, in V.
    pub voltages: [f32; CHANNELS_PER_MODULE],
    /// Current of each channel, in mA.
    pub currents: [f32; CHANNELS_PER_MODULE],
}

impl ModuleSample {
    /// Derive both channels from averaged readings and their calibration
    /// offsets.
    pub fn derive(raw: &RawModuleReadings, offsets_ma: [f32; CHANNELS_PER_MODULE]) -> Self {
        let voltages = [
            differential_voltage(raw[2], raw[3]),
            differential_voltage(raw[4], raw[5]),
        ];
        let currents = [
            calibrated_current(raw[0], offsets_ma[0], voltages[0]),
            calibrated_current(raw[1], offsets_ma[1], voltages[1]),
        ];
        Self { voltages, currents }
    }
}

/// Latest voltage and current of every channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurements {
    /// Channel voltages, in V.
    pub voltages: [f32; CHANNEL_COUNT],
    /// Channel currents, in mA.
    pub currents: [f32; CHANNEL_COUNT],
}

impl Measurements {
    /// Store a module's sample at the slots of its two channels.
    pub(crate) fn store(&mut self, module_index: usize, sample: ModuleSample) {
        let first = module_index * CHANNELS_PER_MODULE;
        self.voltages[first..first + CHANNELS_PER_MODULE].copy_from_slice(&sample.voltages);
        self.currents[first..first + CHANNELS_PER_MODULE].copy_from_slice(&sample.currents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn average_rounds_to_nearest() {
        let mut acc = Accumulator::default();
        for reading in [10, 10, 11, 11, 11] {
            acc.add(0, reading);
            acc.add(1, reading + 1000);
            acc.end_pass();
        }
        let avg = acc.average();
        assert_eq!(avg[0], 11); // 10.6
        assert_eq!(avg[1], 1011);
        assert_eq!(avg[2], 0);
    }

    #[test]
    fn unsampled_inputs_are_ignored() {
        let mut acc = Accumulator::default();
        acc.add(6, 4095);
        acc.add(usize::MAX, 4095);
        acc.end_pass();
        assert_eq!(acc.average(), [0; ADC_INPUTS_PER_MODULE]);
    }

    #[test]
    fn full_scale_count_is_25_units() {
        assert!(approx(counts_to_sense(4096.0), 25.0));
        assert!(approx(counts_to_sense(0.0), 0.0));
    }

    #[test]
    fn differential_voltage_is_signed() {
        assert!(approx(differential_voltage(1638, 0), 9.997_559));
        assert!(approx(differential_voltage(0, 1638), -9.997_559));
    }

    #[test]
    fn current_takes_sign_of_voltage() {
        let raw = [164, 164, 0, 164, 164, 0];
        let sample = ModuleSample::derive(&raw, [0.03, -0.13]);
        assert!(sample.voltages[0] < 0.0);
        assert!(sample.voltages[1] > 0.0);
        let magnitude = counts_to_sense(164.0);
        assert!(approx(sample.currents[0], -(magnitude + 0.03)));
        assert!(approx(sample.currents[1], magnitude - 0.13));
    }

    #[test]
    fn zero_voltage_counts_as_positive() {
        assert!(approx(calibrated_current(0, 0.05, 0.0), 0.05));
    }

    #[test]
    fn store_places_module_channels() {
        let mut m = Measurements::default();
        let sample = ModuleSample {
            voltages: [1.0, 2.0],
            currents: [3.0, 4.0],
        };
        m.store(2, sample);
        assert_eq!(m.voltages[4..6], [1.0, 2.0]);
        assert_eq!(m.currents[4..6], [3.0, 4.0]);
        assert_eq!(m.voltages[0], 0.0);
    }
}
