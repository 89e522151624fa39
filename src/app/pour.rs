//! Pour orders: one cycle run per drink channel, then the mixer.
//!
//! An order carries a cycle count for each of the six pour channels and a
//! mix flag.  Channels run in ascending order; zero counts are skipped.

use embedded_hal::delay::DelayNs;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::PwmConfig;
use crate::error::{Error, Result};

use super::commands::{ChannelSelector, POUR_CHANNEL_COUNT, ServoChannel};
use super::cycle::CycleRunner;
use super::events::AppEvent;
use super::ports::{EventSink, PwmPort};

/// Wire format matches the mixer front end: `pourAmt0`..`pourAmt5`, `mix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PourOrder {
    pub pour_amt0: u32,
    pub pour_amt1: u32,
    pub pour_amt2: u32,
    pub pour_amt3: u32,
    pub pour_amt4: u32,
    pub pour_amt5: u32,
    pub mix: bool,
}

fn invalid_order(e: serde_json::Error) -> Error {
    Error::InvalidOrder(e.to_string())
}

impl PourOrder {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(invalid_order)
    }

    /// Cycle counts indexed by pour channel.
    pub fn amounts(&self) -> [u32; POUR_CHANNEL_COUNT] {
        [
            self.pour_amt0,
            self.pour_amt1,
            self.pour_amt2,
            self.pour_amt3,
            self.pour_amt4,
            self.pour_amt5,
        ]
    }

    /// True when nothing would move.
    pub fn is_empty(&self) -> bool {
        !self.mix && self.amounts().iter().all(|&a| a == 0)
    }
}

/// Run a whole order.  Returns the total number of cycles performed.
pub fn run_pour_order(
    config: &PwmConfig,
    pwm: &mut impl PwmPort,
    delay: &mut impl DelayNs,
    sink: &mut impl EventSink,
    order: &PourOrder,
) -> Result<u32> {
    let amounts = order.amounts();
    let channels = amounts.iter().filter(|&&a| a > 0).count();
    sink.emit(&AppEvent::PourStarted {
        channels,
        mix: order.mix,
    });

    let runner = CycleRunner::new(config.clone());
    runner.prepare(pwm)?;

    let mut cycles = 0;
    for (channel, &amount) in ServoChannel::ALL.iter().zip(amounts.iter()) {
        if amount == 0 {
            continue;
        }
        cycles += runner.run(pwm, delay, sink, ChannelSelector::Channel(*channel), amount)?;
    }
    if order.mix {
        cycles += runner.run(pwm, delay, sink, ChannelSelector::Mix, 1)?;
    }

    info!("pour order finished, {} cycle(s)", cycles);
    sink.emit(&AppEvent::PourFinished);
    Ok(cycles)
}
