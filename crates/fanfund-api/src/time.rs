use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Parses timestamps coming back from the database. SQLite's
/// `datetime('now')` yields "YYYY-MM-DD HH:MM:SS" without a timezone;
/// parse as naive UTC and convert. RFC 3339 values pass through as-is.
pub(crate) fn parse_db_time(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sqlite_format_parses_as_utc() {
        let parsed = parse_db_time("2024-06-01 12:30:45");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap());
    }

    #[test]
    fn rfc3339_passes_through() {
        let parsed = parse_db_time("2024-06-01T12:30:45Z");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap());
    }

    #[test]
    fn garbage_falls_back_to_the_epoch() {
        assert_eq!(parse_db_time("not a time"), DateTime::<Utc>::default());
    }
}
