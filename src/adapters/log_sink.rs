//! Console event sink adapter.
//!
//! Implements [`EventSink`] by printing the operator-facing progress lines to
//! stdout and mirroring every event to the `log` facade.  The service that
//! launches the binaries captures stdout, so the progress wording is kept
//! stable.

use std::io::Write;

use log::{debug, info, warn};

use crate::app::commands::ChannelSelector;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that prints progress to any writer (stdout in production).
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // stdout going away must not abort a servo run half-way.
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            debug!("console write failed: {}", e);
        }
    }
}

/// The progress line for one finished cycle.
pub fn completion_line(selector: ChannelSelector) -> String {
    match selector {
        ChannelSelector::Channel(ch) => format!("Servo {} Completed!", ch.index()),
        ChannelSelector::Mix => "Mixing Completed!".to_owned(),
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::CycleStarted { selector, count } => {
                info!("CYCLE | start selector={} count={}", selector, count);
                let text = match selector {
                    ChannelSelector::Channel(ch) => format!(
                        "Moving servo on channel {}, press Ctrl-C to quit...",
                        ch.index()
                    ),
                    ChannelSelector::Mix => "Turning mixing motor...".to_owned(),
                };
                self.line(&text);
            }
            AppEvent::CycleCompleted {
                selector,
                remaining,
            } => {
                info!("CYCLE | done selector={} remaining={}", selector, remaining);
                self.line(&completion_line(*selector));
            }
            AppEvent::ReaderStateChanged { from, to } => {
                debug!("READER | {:?} -> {:?}", from, to);
            }
            AppEvent::AuthFailed { uid } => {
                warn!("READER | auth failed for {}", uid);
                self.line(&format!("Authentication error for tag {uid}"));
            }
            AppEvent::FrameNotReady { polls } => {
                debug!("READER | payment frame not ready (poll {})", polls);
            }
            AppEvent::Cancelled => {
                info!("READER | cancelled");
                self.line("Aborted");
            }
            AppEvent::PourStarted { channels, mix } => {
                info!("POUR | start channels={} mix={}", channels, mix);
            }
            AppEvent::PourFinished => {
                info!("POUR | finished");
                self.line("Pour Completed!");
            }
        }
    }
}
