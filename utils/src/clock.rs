//! Wall-clock time source.

use crossgov_types::{Clock, Timestamp};

/// [`Clock`] backed by the operating system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
