//! Port traits: the boundary between the procedures and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ procedure (cycle runner / tag reader)
//! ```
//!
//! Driven adapters (PCA9685, MFRC522, PN532, GPIO, console) implement these
//! traits.  The procedures consume them via generics, so they never touch
//! a bus directly and run unchanged against simulated drivers.
//!
//! Waits are not a port of their own: every procedure takes an
//! [`embedded_hal::delay::DelayNs`].

use crate::error::{ActuatorError, BusError, ReaderError};

use super::events::AppEvent;
use super::tag_reader::{AuthKey, Block, Uid};

// ───────────────────────────────────────────────────────────────
// PWM port (domain → servo controller)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the PWM controller.
pub trait PwmPort {
    /// Set the output frequency shared by all channels.
    fn set_frequency(&mut self, hz: u16) -> Result<(), ActuatorError>;

    /// Set one channel's on/off tick within the 4096-tick period.
    fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), ActuatorError>;
}

impl<T: PwmPort + ?Sized> PwmPort for &mut T {
    fn set_frequency(&mut self, hz: u16) -> Result<(), ActuatorError> {
        (**self).set_frequency(hz)
    }

    fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), ActuatorError> {
        (**self).set_pwm(channel, on, off)
    }
}

// ───────────────────────────────────────────────────────────────
// Contactless reader port (MFRC522 primitives)
// ───────────────────────────────────────────────────────────────

/// Status returned by the reader primitives that can "miss".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiccStatus {
    /// The command completed.
    Ok,
    /// No tag answered.
    NoTag,
    /// A tag answered but the exchange failed (bad CRC, wrong key, ...).
    Error,
}

/// The reader primitives the UID procedure walks through, in order.
pub trait CardReaderPort {
    /// REQA: ask idle tags in the field to answer.
    fn request(&mut self) -> Result<PiccStatus, ReaderError>;

    /// Run anticollision and return one tag's UID, `None` if it left the field.
    fn anticollision(&mut self) -> Result<Option<Uid>, ReaderError>;

    /// Select the tag with this UID for the following commands.
    fn select_tag(&mut self, uid: &Uid) -> Result<(), ReaderError>;

    /// MIFARE key-A authentication for `block`.
    fn authenticate(&mut self, block: u8, key: &AuthKey, uid: &Uid)
    -> Result<PiccStatus, ReaderError>;

    /// Read one 16-byte block from the authenticated sector.
    fn read_block(&mut self, block: u8) -> Result<Block, ReaderError>;
}

// ───────────────────────────────────────────────────────────────
// Peripheral bus port (payment reader)
// ───────────────────────────────────────────────────────────────

/// Raw fixed-length reads from a bus peripheral.
pub trait PeripheralBusPort {
    /// Fill `buf` from the device at `address`.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// GPIO port
// ───────────────────────────────────────────────────────────────

/// Pins reserved by the reader hardware.
pub trait PinPort {
    /// Release every reserved pin back to its default state.
    fn cleanup(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → console / logging)
// ───────────────────────────────────────────────────────────────

/// The procedures emit [`AppEvent`]s through this port.  Adapters decide
/// where they go (stdout progress lines, log, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
