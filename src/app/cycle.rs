//! Actuator cycle runner.
//!
//! Drives one PCA9685 channel between the configured extremes:
//!
//! ```text
//!  set_pwm(ch, 0, servo_min) ─ hold min ─ set_pwm(ch, 0, servo_max) ─ hold max
//!  └──────────────────────────── one cycle ──────────────────────────────────┘
//! ```
//!
//! Numbered channels repeat the cycle `count` times, counting down to zero.
//! The mix actuator always runs exactly one cycle.  There is no interrupt
//! handling here; SIGINT terminates the process with the servo wherever it
//! was last commanded.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::PwmConfig;
use crate::error::{Error, Result};

use super::commands::{ChannelSelector, CycleRequest};
use super::events::AppEvent;
use super::ports::{EventSink, PwmPort};

pub struct CycleRunner {
    config: PwmConfig,
}

impl CycleRunner {
    pub fn new(config: PwmConfig) -> Self {
        Self { config }
    }

    /// Configure the controller frequency.  Call once before [`run`](Self::run).
    pub fn prepare(&self, pwm: &mut impl PwmPort) -> Result<()> {
        pwm.set_frequency(self.config.frequency_hz)?;
        info!("PWM frequency set to {} Hz", self.config.frequency_hz);
        Ok(())
    }

    /// PCA9685 output behind a selector.
    pub fn output_channel(&self, selector: ChannelSelector) -> u8 {
        match selector {
            ChannelSelector::Channel(ch) => ch.index(),
            ChannelSelector::Mix => self.config.mix_channel,
        }
    }

    /// Run the cycles for `selector`.  Returns the number of cycles performed.
    pub fn run(
        &self,
        pwm: &mut impl PwmPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        selector: ChannelSelector,
        count: u32,
    ) -> Result<u32> {
        let channel = self.output_channel(selector);
        let mut remaining = match selector {
            ChannelSelector::Channel(_) => count,
            ChannelSelector::Mix => 1,
        };
        let total = remaining;

        sink.emit(&AppEvent::CycleStarted {
            selector,
            count: total,
        });

        while remaining > 0 {
            self.cycle(pwm, delay, channel)?;
            remaining -= 1;
            sink.emit(&AppEvent::CycleCompleted {
                selector,
                remaining,
            });
        }

        info!("{} cycle(s) done on selector {}", total, selector);
        Ok(total)
    }

    fn cycle(&self, pwm: &mut impl PwmPort, delay: &mut impl DelayNs, channel: u8) -> Result<()> {
        debug!("ch{} -> min {}", channel, self.config.servo_min);
        pwm.set_pwm(channel, 0, self.config.servo_min)?;
        delay.delay_ms(self.config.min_hold_ms);

        debug!("ch{} -> max {}", channel, self.config.servo_max);
        pwm.set_pwm(channel, 0, self.config.servo_max)?;
        delay.delay_ms(self.config.max_hold_ms);
        Ok(())
    }
}

/// Full `actuator-cycle` procedure: parse `<channel> [count]`, open the
/// controller through `open_pwm`, prepare it and run.  `open_pwm` is only
/// called once the arguments are accepted, so a rejected selector never
/// reaches the hardware.
pub fn run_from_args<S, P, E>(
    args: &[S],
    config: &PwmConfig,
    open_pwm: impl FnOnce(&PwmConfig) -> core::result::Result<P, E>,
    delay: &mut impl DelayNs,
    sink: &mut impl EventSink,
) -> core::result::Result<u32, E>
where
    S: AsRef<str>,
    P: PwmPort,
    E: From<Error>,
{
    let request = CycleRequest::from_args(args)?;
    let mut pwm = open_pwm(config)?;
    let runner = CycleRunner::new(config.clone());
    runner.prepare(&mut pwm)?;
    Ok(runner.run(&mut pwm, delay, sink, request.selector, request.count)?)
}
