pub mod progress;
pub mod quizzes;
pub mod users;
pub mod vocabulary;

use chrono::{DateTime, SecondsFormat, Utc};

pub use progress::*;
pub use quizzes::*;
pub use users::*;
pub use vocabulary::*;

/// Timestamps are stored as fixed-width RFC 3339 strings in UTC so that
/// lexical order in SQLite matches chronological order.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let a = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let b = a + chrono::Duration::milliseconds(1);
        assert!(format_timestamp(a) < format_timestamp(b));
        assert_eq!(format_timestamp(a), "2026-01-02T03:04:05.000Z");
        assert_eq!(parse_timestamp(&format_timestamp(b)), Some(b));
    }
}
