//! Small shared helpers.

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Render the wall-clock time of `at` in `offset` as `HH:MM:SS`.
pub fn format_clock(at: OffsetDateTime, offset: UtcOffset) -> String {
    let clock = format_description!("[hour]:[minute]:[second]");
    at.to_offset(offset).format(&clock).unwrap_or_default()
}

/// Timestamp for a unix-millisecond value, clamped to the representable range.
pub fn from_unix_millis(millis: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
