//! MFRC522 adapter. Maps the `mfrc522` crate onto [`CardReaderPort`].
//!
//! The crate folds anticollision and select into one `select` call, so
//! `anticollision` runs it and remembers the tag; `select_tag` only checks
//! the caller asks for that same tag.  A timeout means no tag answered; any
//! other tag-side failure is reported as [`PiccStatus::Error`].  SPI failures
//! are hard errors.

use core::fmt::Debug;

use log::{debug, warn};
use mfrc522::comm::Interface;
use mfrc522::error::Error as DriverError;
use mfrc522::{AtqA, Initialized, Mfrc522};

use crate::app::ports::{CardReaderPort, PiccStatus};
use crate::app::tag_reader::{AuthKey, Block, Uid};
use crate::error::ReaderError;

pub struct Mfrc522Reader<COMM: Interface> {
    dev: Mfrc522<COMM, Initialized>,
    atqa: Option<AtqA>,
    selected: Option<mfrc522::Uid>,
}

impl<COMM: Interface> Mfrc522Reader<COMM> {
    pub fn new(dev: Mfrc522<COMM, Initialized>) -> Self {
        Self {
            dev,
            atqa: None,
            selected: None,
        }
    }
}

/// Split a driver error into "the tag misbehaved" and "the bus failed".
fn classify<E: Debug>(op: &str, err: DriverError<E>) -> Result<PiccStatus, ReaderError> {
    match err {
        DriverError::Timeout => Ok(PiccStatus::NoTag),
        DriverError::Comm(e) => {
            warn!("mfrc522 {}: SPI error {:?}", op, e);
            Err(ReaderError::Transport)
        }
        other => {
            debug!("mfrc522 {}: {:?}", op, other);
            Ok(PiccStatus::Error)
        }
    }
}

impl<COMM> CardReaderPort for Mfrc522Reader<COMM>
where
    COMM: Interface,
    COMM::Error: Debug,
{
    fn request(&mut self) -> Result<PiccStatus, ReaderError> {
        match self.dev.reqa() {
            Ok(atqa) => {
                self.atqa = Some(atqa);
                Ok(PiccStatus::Ok)
            }
            Err(e) => {
                self.atqa = None;
                classify("reqa", e)
            }
        }
    }

    fn anticollision(&mut self) -> Result<Option<Uid>, ReaderError> {
        let Some(atqa) = self.atqa.take() else {
            return Ok(None);
        };
        match self.dev.select(&atqa) {
            Ok(uid) => {
                let Some(ours) = Uid::from_slice(uid.as_bytes()) else {
                    return Err(ReaderError::Protocol);
                };
                self.selected = Some(uid);
                Ok(Some(ours))
            }
            Err(e) => {
                self.selected = None;
                classify("select", e).map(|_| None)
            }
        }
    }

    fn select_tag(&mut self, uid: &Uid) -> Result<(), ReaderError> {
        match &self.selected {
            Some(sel) if sel.as_bytes() == uid.as_bytes() => Ok(()),
            _ => Err(ReaderError::NoTagSelected),
        }
    }

    fn authenticate(
        &mut self,
        block: u8,
        key: &AuthKey,
        _uid: &Uid,
    ) -> Result<PiccStatus, ReaderError> {
        let Some(selected) = &self.selected else {
            return Err(ReaderError::NoTagSelected);
        };
        match self.dev.mf_authenticate(selected, block, key) {
            Ok(()) => Ok(PiccStatus::Ok),
            Err(e) => {
                let status = classify("auth", e)?;
                // Crypto1 stays half-armed after a rejected key.
                if let Err(e) = self.dev.stop_crypto1() {
                    debug!("mfrc522 stop_crypto1: {:?}", e);
                }
                self.selected = None;
                Ok(status)
            }
        }
    }

    fn read_block(&mut self, block: u8) -> Result<Block, ReaderError> {
        if self.selected.is_none() {
            return Err(ReaderError::NoTagSelected);
        }
        let data = self.dev.mf_read(block).map_err(|e| match e {
            DriverError::Comm(e) => {
                warn!("mfrc522 read: SPI error {:?}", e);
                ReaderError::Transport
            }
            other => {
                debug!("mfrc522 read block {}: {:?}", block, other);
                ReaderError::Protocol
            }
        })?;

        // Leave the tag halted and the reader unencrypted for the next run.
        if let Err(e) = self.dev.hlta() {
            debug!("mfrc522 hlta: {:?}", e);
        }
        if let Err(e) = self.dev.stop_crypto1() {
            debug!("mfrc522 stop_crypto1: {:?}", e);
        }
        self.selected = None;
        Ok(data)
    }
}
