//! Application core: the procedures, with no direct I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod cycle;
pub mod events;
pub mod ports;
pub mod pour;
pub mod tag_reader;
