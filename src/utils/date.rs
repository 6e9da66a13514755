// Local wall-clock parsing for schedule starts and --at instants

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Datetime layouts accepted for a schedule start, tried in order.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a schedule instant in local time.
///
/// Bare dates read as local midnight. Returns `None` for anything
/// unparseable, and for wall-clock times a DST transition makes ambiguous
/// or nonexistent; callers treat that the same as no value at all.
pub fn parse_local_datetime(text: &str) -> Option<DateTime<Local>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Local.from_local_datetime(&naive).single();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Local.from_local_datetime(&naive).single();
    }
    None
}

/// The current instant in epoch milliseconds.
pub fn now_ms() -> i64 {
    Local::now().timestamp_millis()
}

/// Resolve an `--at` style expression: "now" or any schedule layout.
pub fn parse_instant_expr(expr: &str) -> Option<i64> {
    if expr.trim() == "now" {
        return Some(now_ms());
    }
    parse_local_datetime(expr).map(|dt| dt.timestamp_millis())
}

/// Render an epoch instant as local wall-clock text.
pub fn format_local(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "invalid instant".to_string())
}

/// The current instant in the layout `set start now` stores.
pub fn format_start_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parses_t_separated_datetime() {
        let dt = parse_local_datetime("2026-01-15T09:30").unwrap();
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_parses_space_separated_datetime_with_seconds() {
        let dt = parse_local_datetime("2026-01-15 09:30:45").unwrap();
        assert_eq!(dt.second(), 45);
    }

    #[test]
    fn test_bare_date_is_local_midnight() {
        let dt = parse_local_datetime("2026-01-15").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(parse_local_datetime("  2026-01-15T09:30  ").is_some());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_local_datetime("").is_none());
        assert!(parse_local_datetime("   ").is_none());
        assert!(parse_local_datetime("soon").is_none());
        assert!(parse_local_datetime("2026-13-40T09:30").is_none());
        assert!(parse_local_datetime("09:30").is_none());
    }

    #[test]
    fn test_instant_expr_now_and_datetime() {
        assert!(parse_instant_expr("now").is_some());
        assert!(parse_instant_expr("2026-01-15T09:30").is_some());
        assert!(parse_instant_expr("whenever").is_none());
    }

    #[test]
    fn test_round_trips_through_format_local() {
        let ms = parse_instant_expr("2026-01-15 09:30:45").unwrap();
        assert_eq!(format_local(ms), "2026-01-15 09:30:45");
    }
}
