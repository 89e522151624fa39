//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter          | Implements                         | Connects to         |
//! |------------------|------------------------------------|---------------------|
//! | `hardware`       | CardReaderPort, PeripheralBusPort, | any reader bundle   |
//! |                  | PinPort                            |                     |
//! | `log_sink`       | EventSink                          | stdout + `log`      |
//! | `mfrc522_reader` | CardReaderPort                     | MFRC522 over SPI    |
//! | `rpi`            | (bring-up)                         | rppal I2C/SPI/GPIO  |

pub mod hardware;
pub mod log_sink;
#[cfg(feature = "rpi")]
pub mod mfrc522_reader;
#[cfg(feature = "rpi")]
pub mod rpi;
