//! Signal-driven cancellation flag.
//!
//! The interrupt handler (installed by the `tag-reader` binary through
//! `ctrlc`) runs on its own thread and only ever sets the flag.  The
//! polling loops read it once per iteration.
//!
//! ```text
//! ┌─────────────┐  cancel()  ┌─────────────┐  is_cancelled()  ┌────────────┐
//! │ SIGINT hook │──────────▶│ AtomicBool  │◀────────────────│ poll loop  │
//! └─────────────┘            └─────────────┘                  └────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to a shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
