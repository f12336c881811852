//! Shared utilities for CrossGov.

pub mod clock;
pub mod locks;
pub mod logging;

pub use clock::SystemClock;
pub use locks::KeyedLocks;
pub use logging::{init_logging, LogFormat};
