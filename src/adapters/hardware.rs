//! Hardware adapter: bundles the reader-side peripherals behind the port
//! traits.
//!
//! The tag reader opens the contactless reader, the payment bus and the
//! reset pin up front, whichever mode it runs in, and hands the bundle to
//! [`TagReader::run`](crate::app::tag_reader::TagReader::run).

use crate::app::ports::{CardReaderPort, PeripheralBusPort, PiccStatus, PinPort};
use crate::app::tag_reader::{AuthKey, Block, Uid};
use crate::error::{BusError, ReaderError};

/// Concrete adapter that combines the reader hardware behind port traits.
pub struct ReaderHardware<R, B, P> {
    reader: R,
    bus: B,
    pins: P,
}

impl<R, B, P> ReaderHardware<R, B, P> {
    pub fn new(reader: R, bus: B, pins: P) -> Self {
        Self { reader, bus, pins }
    }
}

// ── CardReaderPort implementation ─────────────────────────────

impl<R: CardReaderPort, B, P> CardReaderPort for ReaderHardware<R, B, P> {
    fn request(&mut self) -> Result<PiccStatus, ReaderError> {
        self.reader.request()
    }

    fn anticollision(&mut self) -> Result<Option<Uid>, ReaderError> {
        self.reader.anticollision()
    }

    fn select_tag(&mut self, uid: &Uid) -> Result<(), ReaderError> {
        self.reader.select_tag(uid)
    }

    fn authenticate(
        &mut self,
        block: u8,
        key: &AuthKey,
        uid: &Uid,
    ) -> Result<PiccStatus, ReaderError> {
        self.reader.authenticate(block, key, uid)
    }

    fn read_block(&mut self, block: u8) -> Result<Block, ReaderError> {
        self.reader.read_block(block)
    }
}

// ── PeripheralBusPort implementation ──────────────────────────

impl<R, B: PeripheralBusPort, P> PeripheralBusPort for ReaderHardware<R, B, P> {
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.bus.read(address, buf)
    }
}

// ── PinPort implementation ────────────────────────────────────

impl<R, B, P: PinPort> PinPort for ReaderHardware<R, B, P> {
    fn cleanup(&mut self) {
        self.pins.cleanup();
    }
}
