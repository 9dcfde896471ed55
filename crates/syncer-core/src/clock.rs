//! Wall-clock helpers. All timestamps on the wire are nanoseconds since the
//! Unix epoch.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in nanoseconds since the Unix epoch.
///
/// A clock set before the epoch reads as 0.
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}

/// Elapsed time between two nanosecond timestamps, saturating at zero.
pub fn elapsed_between(earlier: u64, later: u64) -> Duration {
    Duration::from_nanos(later.saturating_sub(earlier))
}
