//! Timestamp formatting in the deployment's civil timezone.
//!
//! All persisted timestamps are `YYYY-MM-DD HH:MM:SS` strings in
//! Pacific/Auckland, matching the rows the blog platform already stores and
//! supporting lexical comparison for expiry queries.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Pacific::Auckland;

/// Format an instant as an NZ-local SQLite-friendly timestamp.
pub fn format_nz_sqlite(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Auckland)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Current NZ time formatted for inserts and comparisons.
pub fn now_nz_sqlite() -> String {
    format_nz_sqlite(Utc::now())
}

/// Expiry timestamp `hours` from now, NZ-formatted.
pub fn expires_at_after(hours: i64) -> String {
    format_nz_sqlite(Utc::now() + Duration::hours(hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_during_nz_daylight_time() {
        // January is NZDT, UTC+13.
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 0, 30, 5).unwrap();
        assert_eq!(format_nz_sqlite(instant), "2024-01-15 13:30:05");
    }

    #[test]
    fn test_format_during_nz_standard_time() {
        // June is NZST, UTC+12.
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(format_nz_sqlite(instant), "2024-06-15 12:00:00");
    }

    #[test]
    fn test_expiry_sorts_after_now() {
        // Lexical comparison works because the format is fixed-width.
        assert!(expires_at_after(12) > now_nz_sqlite());
    }
}
