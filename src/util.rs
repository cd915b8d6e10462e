//! Small time helpers shared across subsystems.

use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, used for `Ticker` timestamps.
///
/// Saturates to zero if the system clock is set before the epoch rather
/// than panicking — a trading venue should never crash because of a
/// misconfigured clock.
pub fn current_time_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
