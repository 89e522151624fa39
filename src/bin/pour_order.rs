//! `pour-order <json>`
//!
//! Runs a whole drink: `{"pourAmt0":2,...,"pourAmt5":0,"mix":true}`.

use anyhow::{Context, Result};
use log::{info, warn};
use rppal::hal::Delay;

use barmixer::adapters::log_sink::ConsoleSink;
use barmixer::adapters::rpi;
use barmixer::app::pour::{PourOrder, run_pour_order};
use barmixer::config;
use barmixer::error::Error;

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let Some(text) = std::env::args().nth(1) else {
        return Err(Error::MissingArgument("order").into());
    };
    let order = PourOrder::from_json(&text)?;
    if order.is_empty() {
        warn!("pour-order: nothing to pour");
        return Ok(());
    }
    let config = config::load_from_env().context("loading configuration")?;

    let mut pwm = rpi::open_pwm(&config.pwm)?;
    let mut delay = Delay::new();
    let mut sink = ConsoleSink::stdout();

    let cycles = run_pour_order(&config.pwm, &mut pwm, &mut delay, &mut sink, &order)?;
    info!("pour-order: {} cycle(s)", cycles);
    Ok(())
}
