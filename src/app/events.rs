//! Outbound application events.
//!
//! The procedures emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them: print a
//! progress line, log, record for a test.

use super::commands::ChannelSelector;
use super::tag_reader::{ReaderState, Uid};

/// Structured events emitted by the procedures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A cycle run is about to start.
    CycleStarted { selector: ChannelSelector, count: u32 },

    /// One min→max cycle finished; `remaining` cycles are left.
    CycleCompleted { selector: ChannelSelector, remaining: u32 },

    /// The tag reader moved between states.
    ReaderStateChanged { from: ReaderState, to: ReaderState },

    /// A tag answered but rejected the key.
    AuthFailed { uid: Uid },

    /// A payment frame was polled but not ready.
    FrameNotReady { polls: u32 },

    /// The reader was interrupted and released its pins.
    Cancelled,

    /// A pour order started with this many non-empty channels.
    PourStarted { channels: usize, mix: bool },

    /// A pour order finished.
    PourFinished,
}
