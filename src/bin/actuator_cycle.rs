//! `actuator-cycle <channel> [count]`
//!
//! Cycles pour servo `channel` (0..=5) between its extremes `count` times,
//! or runs the mixing actuator once for `mix`.  No interrupt handler is
//! installed: Ctrl-C stops the process where it stands.

use anyhow::{Context, Result};
use log::info;
use rppal::hal::Delay;

use barmixer::adapters::log_sink::ConsoleSink;
use barmixer::adapters::rpi;
use barmixer::app::cycle::run_from_args;
use barmixer::config;

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = config::load_from_env().context("loading configuration")?;

    let mut delay = Delay::new();
    let mut sink = ConsoleSink::stdout();

    let cycles = run_from_args(&args, &config.pwm, rpi::open_pwm, &mut delay, &mut sink)?;
    info!("actuator-cycle: {} cycle(s)", cycles);
    Ok(())
}
