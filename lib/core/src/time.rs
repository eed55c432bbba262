//! Instants and durations shared by every trigger.

use chrono::{DateTime, Duration, Utc};

/// An absolute instant. All trigger arithmetic happens in UTC.
pub type Timestamp = DateTime<Utc>;

/// Converts a whole number of seconds into a [`Duration`].
///
/// Returns `None` when the value does not fit in chrono's range.
#[must_use]
pub fn seconds(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

/// Adds `delta` to `instant`, returning `None` on overflow.
#[must_use]
pub fn checked_add(instant: Timestamp, delta: Duration) -> Option<Timestamp> {
    instant.checked_add_signed(delta)
}
