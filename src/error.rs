//! Unified error types for the mixer procedures.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! binaries can report any failure the same way.  Hardware-facing variants
//! are `Copy`; only the argument errors carry the offending text.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required positional argument was not supplied.
    MissingArgument(&'static str),
    /// The channel selector is not one of `0`..`5` or `mix`.
    UnknownChannel(String),
    /// The repeat count is not a non-negative integer.
    InvalidCount(String),
    /// The reader mode selector is not recognised.
    UnknownMode(String),
    /// A pour order could not be decoded.
    InvalidOrder(String),
    /// A PWM controller command failed.
    Actuator(ActuatorError),
    /// The contactless reader failed.
    Reader(ReaderError),
    /// The payment peripheral bus failed.
    Bus(BusError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument(name) => write!(f, "missing argument: {name}"),
            Self::UnknownChannel(s) => write!(f, "unknown channel selector '{s}'"),
            Self::InvalidCount(s) => write!(f, "invalid repeat count '{s}'"),
            Self::UnknownMode(s) => write!(f, "unknown reader mode '{s}'"),
            Self::InvalidOrder(msg) => write!(f, "invalid pour order: {msg}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Reader(e) => write!(f, "reader: {e}"),
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// I2C write to the PWM controller failed.
    PwmWriteFailed,
    /// I2C read from the PWM controller failed.
    PwmReadFailed,
    /// Channel index is outside the controller's 16 outputs.
    InvalidChannel(u8),
    /// Requested frequency cannot be reached with the prescaler.
    FrequencyOutOfRange(u16),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::PwmReadFailed => write!(f, "PWM read failed"),
            Self::InvalidChannel(ch) => write!(f, "invalid PWM channel {ch}"),
            Self::FrequencyOutOfRange(hz) => write!(f, "PWM frequency {hz} Hz out of range"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Contactless reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// SPI transfer to the reader failed.
    Transport,
    /// The reader could not be initialised.
    InitFailed,
    /// The tag answered with a malformed or unexpected frame.
    Protocol,
    /// A block read was attempted without a selected tag.
    NoTagSelected,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "SPI transfer failed"),
            Self::InitFailed => write!(f, "reader init failed"),
            Self::Protocol => write!(f, "tag protocol error"),
            Self::NoTagSelected => write!(f, "no tag selected"),
        }
    }
}

impl std::error::Error for ReaderError {}

impl From<ReaderError> for Error {
    fn from(e: ReaderError) -> Self {
        Self::Reader(e)
    }
}

// ---------------------------------------------------------------------------
// Peripheral bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The I2C read transaction failed.
    ReadFailed,
    /// No device acknowledged the address.
    NoAcknowledge(u8),
    /// The requested frame does not fit the receive buffer.
    FrameTooLong(usize),
    /// A zero-length frame was requested.
    EmptyFrame,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "I2C read failed"),
            Self::NoAcknowledge(addr) => write!(f, "no acknowledge from 0x{addr:02x}"),
            Self::FrameTooLong(len) => write!(f, "frame length {len} exceeds buffer"),
            Self::EmptyFrame => write!(f, "frame length is zero"),
        }
    }
}

impl std::error::Error for BusError {}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
