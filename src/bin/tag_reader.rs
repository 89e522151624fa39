//! `tag-reader <mode>`
//!
//! `0` / `uid` / `false`: wait for a MIFARE tag and print its UID and user
//! block.  `1` / `payment` / `true`: poll the PN532 until it has a frame
//! and print it.  Ctrl-C stops polling, releases the reader's GPIO lines
//! and exits cleanly.

use anyhow::{Context, Result};
use log::info;
use rppal::hal::Delay;

use barmixer::adapters::log_sink::ConsoleSink;
use barmixer::adapters::rpi;
use barmixer::app::commands::mode_from_args;
use barmixer::app::tag_reader::{ReadOutcome, TagRead, TagReader};
use barmixer::cancel::CancelToken;
use barmixer::config;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = mode_from_args(&args)?;
    let config = config::load_from_env().context("loading configuration")?;

    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || handle.cancel())
        .context("installing Ctrl-C handler")?;

    let mut hw = rpi::open_reader_hardware(&config.reader)?;
    let mut delay = Delay::new();
    let mut sink = ConsoleSink::stdout();

    let mut reader = TagReader::new(config.reader, config.payment);
    match reader.run(mode, &mut hw, &mut delay, &mut sink, &cancel)? {
        ReadOutcome::Read(TagRead::Uid { uid, block }) => {
            println!("UID {uid}");
            println!("{}", hex(&block));
        }
        ReadOutcome::Read(TagRead::Payment(frame)) => {
            println!("{}", hex(&frame));
        }
        ReadOutcome::Cancelled => {}
    }
    info!("tag-reader: {} poll(s)", reader.polls());
    Ok(())
}
