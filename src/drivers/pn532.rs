//! PN532 payment reader polled as a raw I2C peripheral.
//!
//! Over I2C the PN532 prefixes every read with a status byte; bit 0 set
//! means a response frame follows.  A frame without it is the "no data
//! yet" sentinel the payment loop retries on.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::trace;

use crate::app::ports::PeripheralBusPort;
use crate::error::BusError;

/// Default 7-bit address of the PN532 on I2C.
pub const PN532_I2C_ADDRESS: u8 = 0x24;

/// Status-byte bit signalling a ready response.
pub const PN532_I2C_READY: u8 = 0x01;

/// True when `frame` starts with a ready status byte.
pub fn frame_ready(frame: &[u8]) -> bool {
    matches!(frame.first(), Some(status) if status & PN532_I2C_READY != 0)
}

/// Plain-read access to devices on one I2C bus.
pub struct Pn532Bus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Pn532Bus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }
}

impl<I2C: I2c> PeripheralBusPort for Pn532Bus<I2C> {
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.read(address, buf).map_err(|e| match e.kind() {
            ErrorKind::NoAcknowledge(_) => BusError::NoAcknowledge(address),
            _ => BusError::ReadFailed,
        })?;
        trace!(
            "i2c 0x{:02x}: {} byte(s), status 0x{:02x}",
            address,
            buf.len(),
            buf.first().copied().unwrap_or(0)
        );
        Ok(())
    }
}
