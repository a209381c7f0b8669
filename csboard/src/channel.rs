//! Mapping of logical channels onto modules, DAC outputs and expander pins.
//!
//! Every table here is fixed by the board layout. Board-specific calibration
//! lives in [`BoardConfig`](crate::config::BoardConfig) instead.

use crate::constants::{CHANNEL_COUNT, CHANNELS_PER_MODULE, MODULE_COUNT};

/// DAC7578 output driving each logical channel.
const DAC_SUBCHANNEL_MAP: [u8; CHANNEL_COUNT] = [0, 2, 4, 6, 1, 3, 5, 7];

/// Expander pins for each pair index, in the order SWP, SWN, MUXP, MUXN.
const SWITCH_PIN_MAP: [[u8; 4]; CHANNELS_PER_MODULE] = [[1, 0, 6, 5], [3, 2, 4, 7]];

/// One of the eight logical output channels.
///
/// Construct with [`Channel::new`] or `Channel::try_from(u8)`; both reject
/// indices outside `0..=7`, so every other function in this module can treat
/// a `Channel` as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    /// Create a channel from its index, if it is in range.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Iterate over all eight channels in index order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..CHANNEL_COUNT as u8).map(Channel)
    }

    /// Channel index in `0..=7`.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Module (`1..=4`) that owns this channel.
    pub const fn module(self) -> Module {
        Module(self.0 / CHANNELS_PER_MODULE as u8 + 1)
    }

    /// Position of this channel within its module (0 or 1).
    pub const fn pair_index(self) -> u8 {
        self.0 % CHANNELS_PER_MODULE as u8
    }

    /// DAC7578 output that sets this channel's current magnitude.
    pub const fn dac_subchannel(self) -> u8 {
        DAC_SUBCHANNEL_MAP[self.0 as usize]
    }

    /// Expander pins that realise this channel's polarity.
    pub const fn switch_pins(self) -> SwitchPins {
        SwitchPins::for_pair(self.pair_index())
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Channel::new(value).ok_or(value)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CH{}", self.0)
    }
}

/// One of the four modules, numbered `1..=4`.
///
/// The module number doubles as the multiplexer line that gates its bus
/// segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Module(u8);

impl Module {
    /// Create a module from its number, if it is in `1..=4`.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number as usize <= MODULE_COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Iterate over all four modules in order.
    pub fn all() -> impl Iterator<Item = Module> {
        (1..=MODULE_COUNT as u8).map(Module)
    }

    /// Module number in `1..=4`.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based index, for indexing per-module storage.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Multiplexer line gating this module's bus segment.
    pub const fn mux_line(self) -> u8 {
        self.0
    }

    /// The two channels served by this module, in pair-index order.
    pub const fn channels(self) -> [Channel; CHANNELS_PER_MODULE] {
        let first = (self.0 - 1) * CHANNELS_PER_MODULE as u8;
        [Channel(first), Channel(first + 1)]
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "module {}", self.0)
    }
}

/// The four expander pins behind one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchPins {
    /// Positive-side switch enable.
    pub swp: u8,
    /// Negative-side switch enable.
    pub swn: u8,
    /// Positive mux select.
    pub muxp: u8,
    /// Negative mux select.
    pub muxn: u8,
}

impl SwitchPins {
    const fn for_pair(pair_index: u8) -> Self {
        let [swp, swn, muxp, muxn] = SWITCH_PIN_MAP[pair_index as usize];
        Self { swp, swn, muxp, muxn }
    }

    /// Pins in the order they are written: SWP, SWN, MUXP, MUXN.
    pub const fn in_write_order(self) -> [u8; 4] {
        [self.swp, self.swn, self.muxp, self.muxn]
    }

    /// Bit mask of all four pins in an 8-bit expander port.
    pub const fn mask(self) -> u8 {
        (1 << self.swp) | (1 << self.swn) | (1 << self.muxp) | (1 << self.muxn)
    }
}
