//! Three-position switch/mux state of a channel.

use crate::channel::SwitchPins;
use crate::devices::PinLevel;

/// Direction of a channel's output current.
///
/// The state lives only in the module's expander output latch. Read it back
/// with [`ControlBoard::polarity`].
///
/// [`ControlBoard::polarity`]: crate::ControlBoard::polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Current sourced out of the positive terminal.
    Positive,
    /// Current sourced out of the negative terminal.
    Negative,
    /// Switches open, no current.
    Off,
}

impl Polarity {
    /// Polarity that realises a requested current: its sign, with zero
    /// (and NaN) mapping to [`Polarity::Off`].
    pub fn from_current(current_ma: f32) -> Self {
        if current_ma > 0.0 {
            Self::Positive
        } else if current_ma < 0.0 {
            Self::Negative
        } else {
            Self::Off
        }
    }

    /// Levels for SWP, SWN, MUXP and MUXN, in write order.
    pub const fn levels(self) -> [PinLevel; 4] {
        use PinLevel::{High, Low};
        match self {
            Polarity::Positive => [High, High, High, Low],
            Polarity::Negative => [High, High, Low, High],
            Polarity::Off => [Low, Low, Low, Low],
        }
    }

    /// Pin numbers paired with the level each is driven to, in write order.
    pub fn pin_writes(self, pins: SwitchPins) -> [(u8, PinLevel); 4] {
        let order = pins.in_write_order();
        let levels = self.levels();
        std::array::from_fn(|i| (order[i], levels[i]))
    }

    /// Decode an expander output latch back into a polarity.
    ///
    /// Returns `None` if the four pins hold a combination that none of the
    /// three states produce.
    pub fn from_latch(latch: u8, pins: SwitchPins) -> Option<Self> {
        let level = |pin: u8| PinLevel::from(latch & (1 << pin) != 0);
        let observed = pins.in_write_order().map(level);
        [Polarity::Positive, Polarity::Negative, Polarity::Off]
            .into_iter()
            .find(|p| p.levels() == observed)
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Polarity::Positive => "+",
            Polarity::Negative => "-",
            Polarity::Off => "off",
        };
        f.write_str(s)
    }
}
