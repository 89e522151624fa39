//! Mock hardware adapters for integration tests.
//!
//! Records every driver call so tests can assert on the full command
//! history without touching real I2C/SPI/GPIO.
#![allow(dead_code)]

use std::collections::VecDeque;

use barmixer::app::events::AppEvent;
use barmixer::app::ports::{
    CardReaderPort, EventSink, PeripheralBusPort, PiccStatus, PinPort, PwmPort,
};
use barmixer::app::tag_reader::{AuthKey, Block, Uid};
use barmixer::cancel::CancelToken;
use barmixer::error::{ActuatorError, BusError, ReaderError};
use embedded_hal::delay::DelayNs;

// ── PWM call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmCall {
    Frequency(u16),
    Pwm { channel: u8, on: u16, off: u16 },
}

// ── MockPwm ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPwm {
    pub calls: Vec<PwmCall>,
    /// Fail every `set_pwm` after this many have succeeded.
    pub fail_after: Option<usize>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the pulse commands, in order.
    pub fn pulses(&self) -> Vec<(u8, u16)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                PwmCall::Pwm { channel, off, .. } => Some((channel, off)),
                PwmCall::Frequency(_) => None,
            })
            .collect()
    }
}

impl PwmPort for MockPwm {
    fn set_frequency(&mut self, hz: u16) -> Result<(), ActuatorError> {
        self.calls.push(PwmCall::Frequency(hz));
        Ok(())
    }

    fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), ActuatorError> {
        if let Some(limit) = self.fail_after {
            if self.pulses().len() >= limit {
                return Err(ActuatorError::PwmWriteFailed);
            }
        }
        self.calls.push(PwmCall::Pwm { channel, on, off });
        Ok(())
    }
}

// ── RecordingDelay ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.delays_ms.iter().map(|&d| u64::from(d)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockReaderHw ──────────────────────────────────────────────

/// Scripted reader, bus and pins in one bundle.
///
/// Each queue is consumed front to back; when a queue runs dry the
/// "nothing there" answer is returned (no tag, not-ready frame).
pub struct MockReaderHw {
    pub requests: VecDeque<PiccStatus>,
    pub uids: VecDeque<Option<Uid>>,
    pub auths: VecDeque<PiccStatus>,
    pub block: Block,
    pub frames: VecDeque<Vec<u8>>,
    pub bus_error: Option<BusError>,

    pub request_calls: u32,
    pub select_calls: u32,
    pub auth_calls: Vec<(u8, AuthKey)>,
    pub read_calls: Vec<u8>,
    pub bus_reads: Vec<(u8, usize)>,
    pub cleanups: u32,

    /// Set `cancel` once this many request/bus polls have happened.
    pub cancel_after: Option<(u32, CancelToken)>,
}

pub fn uid(bytes: &[u8]) -> Uid {
    Uid::from_slice(bytes).unwrap()
}

pub fn not_ready_frame(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

pub fn ready_frame(len: usize) -> Vec<u8> {
    let mut f: Vec<u8> = (0..len as u8).collect();
    f[0] = 0x01;
    f
}

impl MockReaderHw {
    pub fn new() -> Self {
        Self {
            requests: VecDeque::new(),
            uids: VecDeque::new(),
            auths: VecDeque::new(),
            block: [0u8; 16],
            frames: VecDeque::new(),
            bus_error: None,
            request_calls: 0,
            select_calls: 0,
            auth_calls: Vec::new(),
            read_calls: Vec::new(),
            bus_reads: Vec::new(),
            cleanups: 0,
            cancel_after: None,
        }
    }

    /// A tag that is present, accepts the key and holds `block`.
    pub fn with_tag(uid_bytes: &[u8], block: Block) -> Self {
        let mut hw = Self::new();
        hw.requests.push_back(PiccStatus::Ok);
        hw.uids.push_back(Some(uid(uid_bytes)));
        hw.auths.push_back(PiccStatus::Ok);
        hw.block = block;
        hw
    }

    fn tick(&mut self, polls: u32) {
        if let Some((after, token)) = &self.cancel_after {
            if polls >= *after {
                token.cancel();
            }
        }
    }
}

impl Default for MockReaderHw {
    fn default() -> Self {
        Self::new()
    }
}

impl CardReaderPort for MockReaderHw {
    fn request(&mut self) -> Result<PiccStatus, ReaderError> {
        self.request_calls += 1;
        self.tick(self.request_calls);
        Ok(self.requests.pop_front().unwrap_or(PiccStatus::NoTag))
    }

    fn anticollision(&mut self) -> Result<Option<Uid>, ReaderError> {
        Ok(self.uids.pop_front().flatten())
    }

    fn select_tag(&mut self, _uid: &Uid) -> Result<(), ReaderError> {
        self.select_calls += 1;
        Ok(())
    }

    fn authenticate(
        &mut self,
        block: u8,
        key: &AuthKey,
        _uid: &Uid,
    ) -> Result<PiccStatus, ReaderError> {
        self.auth_calls.push((block, *key));
        Ok(self.auths.pop_front().unwrap_or(PiccStatus::Error))
    }

    fn read_block(&mut self, block: u8) -> Result<Block, ReaderError> {
        self.read_calls.push(block);
        Ok(self.block)
    }
}

impl PeripheralBusPort for MockReaderHw {
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.bus_reads.push((address, buf.len()));
        let polls = self.bus_reads.len() as u32;
        self.tick(polls);
        if let Some(e) = self.bus_error {
            return Err(e);
        }
        let frame = self
            .frames
            .pop_front()
            .unwrap_or_else(|| not_ready_frame(buf.len()));
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        buf[n..].fill(0);
        Ok(())
    }
}

impl PinPort for MockReaderHw {
    fn cleanup(&mut self) {
        self.cleanups += 1;
    }
}
