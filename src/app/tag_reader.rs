//! Tag reader procedure.
//!
//! Two modes share one entry point:
//!
//! ```text
//!  UID mode (MFRC522)
//!
//!  IDLE ──▶ POLLING ──[request OK + UID]──▶ CARD_FOUND
//!              ▲                               │
//!              └───────[auth failed]───────────┤
//!                                         [auth OK]
//!                                              ▼
//!                 DONE ◀── BLOCK_READ ◀── AUTHENTICATED
//!
//!  Payment mode (PN532 over I2C)
//!
//!  IDLE ──▶ POLLING ──[sleep, read frame, ready bit set]──▶ DONE
//!              ▲                 │
//!              └──[not ready]────┘
//! ```
//!
//! Both loops check the [`CancelToken`] once per iteration.  Cancellation
//! emits [`AppEvent::Cancelled`], releases the reserved pins and returns
//! [`ReadOutcome::Cancelled`]; it is never an error.

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::{PaymentConfig, ReaderConfig};
use crate::drivers::pn532;
use crate::error::{BusError, Result};

use super::commands::ReaderMode;
use super::events::AppEvent;
use super::ports::{CardReaderPort, EventSink, PeripheralBusPort, PiccStatus, PinPort};

/// Largest payment frame the reader buffers.
pub const MAX_FRAME_LEN: usize = 64;

/// Longest ISO 14443-3 UID (triple size).
pub const MAX_UID_LEN: usize = 10;

/// MIFARE key A.
pub type AuthKey = [u8; 6];

/// One MIFARE Classic data block.
pub type Block = [u8; 16];

/// Raw payment frame, status byte included.
pub type PaymentFrame = Vec<u8, MAX_FRAME_LEN>;

// ───────────────────────────────────────────────────────────────
// Tag UID
// ───────────────────────────────────────────────────────────────

/// A 4, 7 or 10 byte tag UID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid(Vec<u8, MAX_UID_LEN>);

impl Uid {
    /// `None` if `bytes` is longer than a triple-size UID.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// State and outcome
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderState {
    Idle,
    Polling,
    CardFound,
    Authenticated,
    BlockRead,
    Done,
}

/// What a successful read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRead {
    /// UID mode: the tag's UID and the content of the user block.
    Uid { uid: Uid, block: Block },
    /// Payment mode: the raw frame as read.
    Payment(PaymentFrame),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Read(TagRead),
    /// Interrupted; pins were released.
    Cancelled,
}

// ───────────────────────────────────────────────────────────────
// TagReader
// ───────────────────────────────────────────────────────────────

pub struct TagReader {
    reader: ReaderConfig,
    payment: PaymentConfig,
    state: ReaderState,
    polls: u32,
    auth_failures: u32,
}

impl TagReader {
    pub fn new(reader: ReaderConfig, payment: PaymentConfig) -> Self {
        Self {
            reader,
            payment,
            state: ReaderState::Idle,
            polls: 0,
            auth_failures: 0,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Poll cycles performed by the last run.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Authentication rejections seen by the last run.
    pub fn auth_failures(&self) -> u32 {
        self.auth_failures
    }

    /// Dispatch on `mode`.  `hw` provides every reader-side port; only the
    /// ones the mode needs are used.
    pub fn run<H>(
        &mut self,
        mode: ReaderMode,
        hw: &mut H,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        cancel: &CancelToken,
    ) -> Result<ReadOutcome>
    where
        H: CardReaderPort + PeripheralBusPort + PinPort,
    {
        match mode {
            ReaderMode::Uid => self.read_uid(hw, delay, sink, cancel),
            ReaderMode::Payment => self.read_payment(hw, delay, sink, cancel),
        }
    }

    /// UID mode: poll until a tag answers, authenticate, read the user block.
    pub fn read_uid<H>(
        &mut self,
        hw: &mut H,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        cancel: &CancelToken,
    ) -> Result<ReadOutcome>
    where
        H: CardReaderPort + PinPort,
    {
        self.reset();
        self.transition(ReaderState::Polling, sink);
        let block_no = self.reader.data_block;

        loop {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(hw, sink));
            }
            self.polls += 1;

            if hw.request()? != PiccStatus::Ok {
                if self.reader.uid_poll_interval_ms > 0 {
                    delay.delay_ms(self.reader.uid_poll_interval_ms);
                }
                continue;
            }

            let Some(uid) = hw.anticollision()? else {
                debug!("tag left the field during anticollision");
                continue;
            };
            self.transition(ReaderState::CardFound, sink);
            info!("tag {} detected", uid);

            hw.select_tag(&uid)?;
            let status = hw.authenticate(block_no, &self.reader.auth_key, &uid)?;
            if status != PiccStatus::Ok {
                self.auth_failures += 1;
                warn!(
                    "tag {} rejected key for block {} ({:?}), attempt {}",
                    uid, block_no, status, self.auth_failures
                );
                sink.emit(&AppEvent::AuthFailed { uid });
                self.transition(ReaderState::Polling, sink);
                continue;
            }
            self.transition(ReaderState::Authenticated, sink);

            let block = hw.read_block(block_no)?;
            self.transition(ReaderState::BlockRead, sink);
            self.transition(ReaderState::Done, sink);
            return Ok(ReadOutcome::Read(TagRead::Uid { uid, block }));
        }
    }

    /// Payment mode: sleep, read a frame, repeat until the status byte
    /// reports ready.
    pub fn read_payment<H>(
        &mut self,
        hw: &mut H,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        cancel: &CancelToken,
    ) -> Result<ReadOutcome>
    where
        H: PeripheralBusPort + PinPort,
    {
        self.reset();
        let len = self.payment.frame_len;
        if len == 0 {
            return Err(BusError::EmptyFrame.into());
        }
        if len > MAX_FRAME_LEN {
            return Err(BusError::FrameTooLong(len).into());
        }
        self.transition(ReaderState::Polling, sink);

        let mut buf = [0u8; MAX_FRAME_LEN];
        loop {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(hw, sink));
            }
            delay.delay_ms(self.payment.poll_interval_ms);
            self.polls += 1;

            let frame = &mut buf[..len];
            hw.read(self.payment.i2c_address, frame)?;

            if pn532::frame_ready(frame) {
                // `len <= MAX_FRAME_LEN` was checked above.
                let Ok(frame) = PaymentFrame::from_slice(frame) else {
                    return Err(BusError::FrameTooLong(len).into());
                };
                info!("payment frame ready after {} poll(s)", self.polls);
                self.transition(ReaderState::Done, sink);
                return Ok(ReadOutcome::Read(TagRead::Payment(frame)));
            }
            sink.emit(&AppEvent::FrameNotReady { polls: self.polls });
        }
    }

    fn reset(&mut self) {
        self.state = ReaderState::Idle;
        self.polls = 0;
        self.auth_failures = 0;
    }

    fn transition(&mut self, to: ReaderState, sink: &mut impl EventSink) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!("reader {:?} -> {:?}", from, to);
        sink.emit(&AppEvent::ReaderStateChanged { from, to });
    }

    fn cancelled(&mut self, pins: &mut impl PinPort, sink: &mut impl EventSink) -> ReadOutcome {
        warn!("reader interrupted in {:?}, releasing pins", self.state);
        sink.emit(&AppEvent::Cancelled);
        pins.cleanup();
        self.state = ReaderState::Idle;
        ReadOutcome::Cancelled
    }
}
