//! Barmixer hardware procedures.
//!
//! Exposes the procedures, ports and drivers for the binaries and for
//! integration testing against simulated hardware.  Everything that opens a
//! real Raspberry Pi peripheral is behind the `rpi` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cancel;
pub mod config;
pub mod drivers;
pub mod error;

pub use error::{Error, Result};
