use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only layouts, ISO first, then the day-first layout used by pt-BR
/// spreadsheet exports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a spreadsheet date cell into a calendar date.
///
/// Returns `None` when no known layout matches; the caller decides whether
/// that is an error.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    parse_month(s)
}

/// Month-only cells (`2024-01`, `01/2024`) mean the first of that month.
fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("01/{s}"), "%d/%m/%Y"))
        .ok()
}

/// `YYYY-MM` key of the month a date falls in.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_and_slashed_dates() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date(" 2024/03/02 "), Some(ymd(2024, 3, 2)));
    }

    #[test]
    fn slashed_day_first_layout() {
        assert_eq!(parse_date("15/01/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("02/03/2024"), Some(ymd(2024, 3, 2)));
    }

    #[test]
    fn time_component_is_dropped() {
        assert_eq!(parse_date("2024-01-15 08:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T08:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15/01/2024 08:30"), Some(ymd(2024, 1, 15)));
        assert_eq!(
            parse_date("2024-01-15T23:30:00-03:00"),
            Some(ymd(2024, 1, 15))
        );
    }

    #[test]
    fn dashed_day_first_layout() {
        assert_eq!(parse_date("15-01-2024"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn month_only_cells_are_the_first_of_the_month() {
        assert_eq!(parse_date("2024-01"), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_date(" 2023-12 "), Some(ymd(2023, 12, 1)));
        assert_eq!(parse_date("03/2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("2024-13"), None);
        assert_eq!(parse_date("13/2024"), None);
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("31/31/2024"), None);
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(ymd(2024, 1, 31)), "2024-01");
        assert_eq!(month_key(ymd(2023, 12, 1)), "2023-12");
    }
}
