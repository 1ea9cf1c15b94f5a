//! Database access for the verification service
//!
//! Free functions over the shared SQLite pool, one module per table.
//! Schema creation lives in gdg-common so every binary initializes the
//! same tables.

pub mod achievements;
pub mod challenges;
pub mod submissions;
pub mod users;

use chrono::{DateTime, Utc};
use gdg_common::{Error, Result};

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // CURRENT_TIMESTAMP defaults are "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc())
        })
        .map_err(|e| Error::Internal(format!("Invalid timestamp '{raw}': {e}")))
}

/// Parse a UUID column
pub(crate) fn parse_uuid(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("Invalid UUID '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2025-06-01T12:30:00+00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_sqlite_default() {
        assert!(parse_timestamp("2025-06-01 12:30:00").is_ok());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
