//! Bus-level drivers for the mixer's I2C peripherals.

pub mod pca9685;
pub mod pn532;
