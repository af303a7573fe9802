// crates/core/src/timestamp.rs
use chrono::{DateTime, NaiveDateTime};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a record timestamp to Unix milliseconds.
///
/// Accepts RFC 3339 (what the CLI writes) and offset-less ISO forms read as
/// UTC. Anything else, including the empty string, sorts as epoch zero.
pub fn parse_timestamp_ms(ts: &str) -> i64 {
    let ts = ts.trim();
    if ts.is_empty() {
        return 0;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.timestamp_millis();
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_with_millis() {
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01.500Z"), 1500);
        assert_eq!(parse_timestamp_ms("2025-01-01T00:00:05Z") - parse_timestamp_ms("2025-01-01T00:00:00Z"), 5000);
    }

    #[test]
    fn test_offset_is_applied() {
        assert_eq!(
            parse_timestamp_ms("2025-01-01T02:00:00+02:00"),
            parse_timestamp_ms("2025-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_naive_forms_read_as_utc() {
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:02"), 2000);
        assert_eq!(parse_timestamp_ms("1970-01-01 00:00:02.250"), 2250);
    }

    #[test]
    fn test_malformed_is_zero() {
        assert_eq!(parse_timestamp_ms(""), 0);
        assert_eq!(parse_timestamp_ms("yesterday"), 0);
        assert_eq!(parse_timestamp_ms("2025-13-45T99:00:00Z"), 0);
    }
}
