//! Raspberry Pi peripheral bring-up (`rpi` feature).
//!
//! Opens I2C bus 1, SPI0/CE0 and the GPIO lines the mixer uses, and wraps
//! them in the crate's drivers and adapters.  Everything returned here
//! implements a port trait; nothing above this module names `rppal`.

use anyhow::{Context, Result};
use log::{info, warn};
use mfrc522::Mfrc522;
use mfrc522::comm::blocking::spi::SpiInterface;
use rppal::gpio::{Gpio, OutputPin};
use rppal::hal::Delay;
use rppal::i2c::I2c;
use rppal::spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi};

use crate::app::ports::{CardReaderPort, PeripheralBusPort, PinPort};
use crate::config::{PwmConfig, ReaderConfig};
use crate::drivers::pca9685::Pca9685;
use crate::drivers::pn532::Pn532Bus;
use crate::error::ReaderError;

use super::hardware::ReaderHardware;
use super::mfrc522_reader::Mfrc522Reader;

/// Reset pulse width for the MFRC522 NRSTPD line.
const READER_RESET_MS: u32 = 50;

/// PCA9685 on I2C bus 1, initialised and awake.
pub fn open_pwm(config: &PwmConfig) -> Result<Pca9685<I2c, Delay>> {
    let addr = config.i2c_address;
    let i2c = I2c::new().context("opening I2C bus 1")?;
    let mut pca = Pca9685::new(i2c, Delay::new(), addr);
    pca.init()
        .with_context(|| format!("initialising PCA9685 at 0x{addr:02x}"))?;
    info!("PCA9685 ready at 0x{:02x}", addr);
    Ok(pca)
}

/// GPIO lines reserved by the reader.  Dropping an rppal pin restores its
/// previous mode, so cleanup is releasing them.
pub struct RpiPins {
    reserved: Vec<OutputPin>,
}

impl PinPort for RpiPins {
    fn cleanup(&mut self) {
        let n = self.reserved.len();
        self.reserved.clear();
        info!("GPIO cleanup: released {} pin(s)", n);
    }
}

/// MFRC522 on SPI0/CE0, PN532 on I2C bus 1 and the reader reset pin.
pub fn open_reader_hardware(
    config: &ReaderConfig,
) -> Result<ReaderHardware<impl CardReaderPort + use<>, impl PeripheralBusPort + use<>, RpiPins>> {
    use embedded_hal::delay::DelayNs;

    let gpio = Gpio::new().context("opening GPIO")?;
    let pin = config.reset_pin;
    let mut reset = gpio
        .get(pin)
        .with_context(|| format!("claiming BCM {pin} for reader reset"))?
        .into_output();
    let mut delay = Delay::new();
    reset.set_low();
    delay.delay_ms(READER_RESET_MS);
    reset.set_high();
    delay.delay_ms(READER_RESET_MS);

    let clock = config.spi_clock_hz;
    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock, Mode::Mode0)
        .context("opening SPI0")?;
    let itf = SpiInterface::new(SimpleHalSpiDevice::new(spi));
    let dev = Mfrc522::new(itf)
        .init()
        .map_err(|e| {
            warn!("MFRC522 init: {:?}", e);
            ReaderError::InitFailed
        })
        .context("initialising MFRC522")?;
    info!("MFRC522 ready on SPI0/CE0");

    let i2c = I2c::new().context("opening I2C bus 1 for PN532")?;

    Ok(ReaderHardware::new(
        Mfrc522Reader::new(dev),
        Pn532Bus::new(i2c),
        RpiPins {
            reserved: vec![reset],
        },
    ))
}
