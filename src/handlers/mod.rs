//! Normalizers: raw API payloads in, [`crate::entry::Entry`] values out.

pub mod discussions;
pub mod rc;

use chrono::{DateTime, Utc};

/// Parses a MediaWiki `...Z`-suffixed timestamp.
pub(crate) fn from_mw_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp {value:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_mw_timestamp() {
        assert_eq!(
            from_mw_timestamp("2023-01-01T12:30:00Z").unwrap(),
            Utc.with_ymd_and_hms(2023, 1, 1, 12, 30, 0).unwrap()
        );
        assert!(from_mw_timestamp("yesterday").is_err());
    }
}
