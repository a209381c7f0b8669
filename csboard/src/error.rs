use embedded_hal::i2c;

/// Wrapper for problems when driving the board.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A logical channel outside `0..=7` was given.
    ///
    /// No bus transaction takes place when this is returned.
    ChannelOutOfRange(u8),
    /// A module outside `1..=4` was given.
    ///
    /// No bus transaction takes place when this is returned.
    ModuleOutOfRange(u8),
    /// An ADS7828 input outside `0..=7` was given.
    AdcChannelOutOfRange(u8),
    /// The I2C bus reported an error.
    ///
    /// Any multiplexer selection or pin writes issued before the failing
    /// transaction have already taken effect.
    Bus(E),
}

impl<E> Error<E> {
    /// True if this error was raised before touching the bus.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Bus(_))
    }
}

#[doc(hidden)]
impl<E: i2c::Error> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::Bus(value)
    }
}

impl<E: i2c::Error> i2c::Error for Error<E> {
    fn kind(&self) -> i2c::ErrorKind {
        match self {
            Error::Bus(e) => e.kind(),
            _ => i2c::ErrorKind::Other,
        }
    }
}

impl<E: core::fmt::Debug> std::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ChannelOutOfRange(ch) => write!(f, "channel {ch} is not in 0..=7"),
            Error::ModuleOutOfRange(m) => write!(f, "module {m} is not in 1..=4"),
            Error::AdcChannelOutOfRange(ch) => write!(f, "ADC input {ch} is not in 0..=7"),
            Error::Bus(e) => write!(f, "I2C bus error: {e:?}"),
        }
    }
}

impl<E: core::fmt::Debug> std::error::Error for Error<E> {}
