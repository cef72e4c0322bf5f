//! Date formatting for page metadata.
//!
//! Timestamps are milliseconds since the Unix epoch, always rendered in UTC
//! so output does not depend on the machine that builds it.

use chrono::{DateTime, Utc};

/// Display format used on pages and the home list.
const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Format a millisecond timestamp as `MM/DD/YYYY`.
///
/// Out-of-range timestamps fall back to the epoch.
pub fn format_date(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .unwrap_or_default()
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        // 2023-11-14T22:13:20Z
        assert_eq!(format_date(1_700_000_000_000), "11/14/2023");
    }

    #[test]
    fn test_format_date_zero_padded() {
        // 2024-01-05T00:00:00Z
        assert_eq!(format_date(1_704_412_800_000), "01/05/2024");
    }

    #[test]
    fn test_format_date_is_utc() {
        // One millisecond before midnight stays on the previous day.
        assert_eq!(format_date(1_704_412_799_999), "01/04/2024");
    }

    #[test]
    fn test_format_date_epoch() {
        assert_eq!(format_date(0), "01/01/1970");
    }

    #[test]
    fn test_now_ms_is_recent() {
        assert!(now_ms() > 1_700_000_000_000);
    }
}
