//! PCA9685 16-channel 12-bit PWM controller (I2C).
//!
//! Only what the servo procedures need: wake-up, prescaler and per-channel
//! on/off ticks.  Register writes are single-byte so auto-increment never
//! has to be enabled.
//!
//! ## Frequency
//!
//! `prescale = round(25 MHz / (4096 × f)) − 1`, valid for 3..=255, which
//! gives 24..=1526 Hz on the internal oscillator.  The prescaler can only be
//! written while the chip sleeps.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, warn};

use crate::app::ports::PwmPort;
use crate::config::PWM_CHANNEL_COUNT;
use crate::error::ActuatorError;

// ── Registers ─────────────────────────────────────────────────

pub const MODE1: u8 = 0x00;
pub const MODE2: u8 = 0x01;
pub const LED0_ON_L: u8 = 0x06;
pub const ALL_LED_ON_L: u8 = 0xFA;
pub const PRESCALE: u8 = 0xFE;

// ── MODE1 / MODE2 bits ────────────────────────────────────────

pub const RESTART: u8 = 0x80;
pub const SLEEP: u8 = 0x10;
pub const ALLCALL: u8 = 0x01;
pub const OUTDRV: u8 = 0x04;

/// Internal oscillator frequency.
pub const OSC_HZ: u32 = 25_000_000;

/// Oscillator settle time after leaving sleep.
const WAKE_DELAY_MS: u32 = 5;

/// Prescaler value for `hz`, `None` if out of range.
pub fn prescale_for(hz: u16) -> Option<u8> {
    if hz == 0 {
        return None;
    }
    let div = 4096 * u32::from(hz);
    let rounded = (OSC_HZ + div / 2) / div;
    let prescale = rounded.checked_sub(1)?;
    if (3..=255).contains(&prescale) {
        Some(prescale as u8)
    } else {
        None
    }
}

pub struct Pca9685<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Pca9685<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Bring the chip to a known state: all outputs off, totem-pole
    /// outputs, awake.
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.set_all_pwm(0, 0)?;
        self.write_reg(MODE2, OUTDRV)?;
        self.write_reg(MODE1, ALLCALL)?;
        self.delay.delay_ms(WAKE_DELAY_MS);

        let mode1 = self.read_reg(MODE1)? & !SLEEP;
        self.write_reg(MODE1, mode1)?;
        self.delay.delay_ms(WAKE_DELAY_MS);
        debug!("pca9685@0x{:02x}: initialised", self.address);
        Ok(())
    }

    /// Same on/off ticks on every channel.
    pub fn set_all_pwm(&mut self, on: u16, off: u16) -> Result<(), ActuatorError> {
        self.write_ticks(ALL_LED_ON_L, on, off)
    }

    /// Give back the bus and delay (tests inspect the bus afterwards).
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write_ticks(&mut self, base: u8, on: u16, off: u16) -> Result<(), ActuatorError> {
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.write_reg(base, on_l)?;
        self.write_reg(base + 1, on_h)?;
        self.write_reg(base + 2, off_l)?;
        self.write_reg(base + 3, off_h)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), ActuatorError> {
        self.i2c.write(self.address, &[reg, value]).map_err(|e| {
            warn!("pca9685 write 0x{:02x} failed: {:?}", reg, e.kind());
            ActuatorError::PwmWriteFailed
        })
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, ActuatorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| {
                warn!("pca9685 read 0x{:02x} failed: {:?}", reg, e.kind());
                ActuatorError::PwmReadFailed
            })?;
        Ok(buf[0])
    }
}

impl<I2C: I2c, D: DelayNs> PwmPort for Pca9685<I2C, D> {
    fn set_frequency(&mut self, hz: u16) -> Result<(), ActuatorError> {
        let Some(prescale) = prescale_for(hz) else {
            return Err(ActuatorError::FrequencyOutOfRange(hz));
        };
        let old_mode = self.read_reg(MODE1)?;
        self.write_reg(MODE1, (old_mode & !RESTART) | SLEEP)?;
        self.write_reg(PRESCALE, prescale)?;
        self.write_reg(MODE1, old_mode)?;
        self.delay.delay_ms(WAKE_DELAY_MS);
        self.write_reg(MODE1, old_mode | RESTART)?;
        debug!("pca9685: {} Hz, prescale {}", hz, prescale);
        Ok(())
    }

    fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), ActuatorError> {
        if channel >= PWM_CHANNEL_COUNT {
            return Err(ActuatorError::InvalidChannel(channel));
        }
        self.write_ticks(LED0_ON_L + 4 * channel, on, off)
    }
}
