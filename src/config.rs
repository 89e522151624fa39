//! Mixer configuration parameters
//!
//! All tunable parameters for the servo and reader procedures.
//! Defaults match the stock board; a JSON file named by `BARMIXER_CONFIG`
//! overrides any subset of them.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::tag_reader::MAX_FRAME_LEN;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "BARMIXER_CONFIG";

/// Number of output channels on the PCA9685.
pub const PWM_CHANNEL_COUNT: u8 = 16;

/// Full-scale PCA9685 counter value (12-bit).
pub const PWM_RESOLUTION: u16 = 4096;

/// PWM controller and servo timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmConfig {
    /// I2C address of the PCA9685
    pub i2c_address: u8,
    /// Output frequency in Hz (60 Hz suits hobby servos)
    pub frequency_hz: u16,
    /// Pulse length at the "closed" extreme, out of 4096
    pub servo_min: u16,
    /// Pulse length at the "open" extreme, out of 4096
    pub servo_max: u16,
    /// Hold time after commanding `servo_min` (milliseconds)
    pub min_hold_ms: u32,
    /// Hold time after commanding `servo_max` (milliseconds)
    pub max_hold_ms: u32,
    /// PCA9685 channel wired to the mixing actuator
    pub mix_channel: u8,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x40,
            frequency_hz: 60,
            servo_min: 150,
            servo_max: 600,
            min_hold_ms: 1000,
            max_hold_ms: 2000,
            mix_channel: 6,
        }
    }
}

/// MFRC522 contactless reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// MIFARE key A used to authenticate the data block
    pub auth_key: [u8; 6],
    /// Block holding the user record
    pub data_block: u8,
    /// Pause between unsuccessful request polls (milliseconds)
    pub uid_poll_interval_ms: u32,
    /// BCM pin driving the reader's NRSTPD line
    pub reset_pin: u8,
    /// SPI clock (Hz)
    pub spi_clock_hz: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            auth_key: [0xFF; 6],
            data_block: 8,
            uid_poll_interval_ms: 50,
            reset_pin: 25,
            spi_clock_hz: 1_000_000,
        }
    }
}

/// PN532 payment reader, polled as a raw I2C peripheral
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// I2C address of the PN532
    pub i2c_address: u8,
    /// Bytes read per poll (at most 64)
    pub frame_len: usize,
    /// Pause before each poll (milliseconds)
    pub poll_interval_ms: u32,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x24,
            frame_len: 64,
            poll_interval_ms: 500,
        }
    }
}

/// Core mixer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub pwm: PwmConfig,
    pub reader: ReaderConfig,
    pub payment: PaymentConfig,
}

impl MixerConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pwm = &self.pwm;
        if pwm.i2c_address > 0x7F {
            return Err(invalid("pwm.i2c_address must be 7-bit"));
        }
        // Prescaler is 8-bit with a floor of 3: 24..=1526 Hz at 25 MHz.
        if !(24..=1526).contains(&pwm.frequency_hz) {
            return Err(invalid("pwm.frequency_hz must be 24..=1526"));
        }
        if pwm.servo_max >= PWM_RESOLUTION || pwm.servo_min >= pwm.servo_max {
            return Err(invalid("pwm.servo_min < pwm.servo_max < 4096 required"));
        }
        if pwm.mix_channel >= PWM_CHANNEL_COUNT || pwm.mix_channel <= 5 {
            return Err(invalid("pwm.mix_channel must be a free channel in 6..=15"));
        }
        let payment = &self.payment;
        if payment.i2c_address > 0x7F {
            return Err(invalid("payment.i2c_address must be 7-bit"));
        }
        if payment.frame_len == 0 || payment.frame_len > MAX_FRAME_LEN {
            return Err(invalid("payment.frame_len must be 1..=64"));
        }
        if self.reader.spi_clock_hz == 0 {
            return Err(invalid("reader.spi_clock_hz must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let Ok(config) = serde_json::from_str::<Self>(text) else {
            return Err(ConfigError::Corrupted);
        };
        config.validate()?;
        Ok(config)
    }
}

/// Load a config file, validating before returning.
pub fn load(path: &Path) -> Result<MixerConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound,
        _ => ConfigError::IoError,
    })?;
    let config = MixerConfig::from_json(&text)?;
    info!("config: loaded {}", path.display());
    Ok(config)
}

/// Load from `BARMIXER_CONFIG` if set, otherwise the defaults.
pub fn load_from_env() -> Result<MixerConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => load(Path::new(&path)),
        None => Ok(MixerConfig::default()),
    }
}

fn invalid(reason: &'static str) -> ConfigError {
    ConfigError::ValidationFailed(reason)
}

/// Errors from loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The named config file does not exist.
    NotFound,
    /// The file is not valid JSON for [`MixerConfig`].
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error while reading the file.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
