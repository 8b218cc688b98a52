//! Free-text date normalization.
//!
//! Documents write dates in several shapes: ISO dates, timestamps, `March 2024`, a bare year,
//! or relative phrases such as `2 weeks ago`. [`normalize_date`] turns any of them into a UTC
//! instant. Relative phrases are resolved against an explicit reference instant supplied by the
//! caller, never against the wall clock.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid year pattern"));

static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+(day|week|month|year)s?\s+ago").expect("valid relative pattern")
});

/// Unit of a relative date expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RelativeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl RelativeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Some(RelativeUnit::Day),
            "week" => Some(RelativeUnit::Week),
            "month" => Some(RelativeUnit::Month),
            "year" => Some(RelativeUnit::Year),
            _ => None,
        }
    }

    /// Length in days. Months and years are approximations (30 and 365 days).
    fn days(self) -> u64 {
        match self {
            RelativeUnit::Day => 1,
            RelativeUnit::Week => 7,
            RelativeUnit::Month => 30,
            RelativeUnit::Year => 365,
        }
    }
}

/// Normalize a free-text date into a UTC instant.
///
/// Formats are attempted in order and the first match wins:
/// 1. `YYYY-MM-DD`
/// 2. `YYYY-MM-DDTHH:MM:SSZ`
/// 3. `YYYY-MM-DDTHH:MM:SS±HHMM` (or `±HH:MM`)
/// 4. `March 2024` (first day of the month)
/// 5. `2024` (January 1)
/// 6. `<N> <day|week|month|year>(s) ago`, relative to `reference`
///
/// Returns `None` when nothing matches or the arithmetic would overflow. This function never
/// panics and never reports an error; an unparseable date is simply absent.
pub fn normalize_date(input: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return start_of_day(date);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%SZ") {
        return Some(dt.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {input}"), "%d %B %Y") {
        return start_of_day(date);
    }

    if BARE_YEAR.is_match(input) {
        let year = input.parse::<i32>().ok()?;
        return start_of_day(NaiveDate::from_ymd_opt(year, 1, 1)?);
    }

    relative_date(input, reference)
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn relative_date(input: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = RELATIVE.captures(input)?;
    let count = caps.get(1)?.as_str().parse::<u64>().ok()?;
    let unit = RelativeUnit::parse(caps.get(2)?.as_str())?;
    let days = count.checked_mul(unit.days())?;
    reference.checked_sub_days(Days::new(days))
}

/// Earliest instant inside a recency window of `window_days` ending at `reference`.
///
/// Saturates to the minimum representable instant for absurdly large windows.
pub fn window_start(reference: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    reference
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(normalize_date("2024-03-15", reference()), Some(ymd(2024, 3, 15)));
        assert_eq!(normalize_date("  2024-03-15 ", reference()), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn parses_utc_timestamp() {
        assert_eq!(
            normalize_date("2024-03-15T08:45:00Z", reference()),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 8, 45, 0).unwrap())
        );
    }

    #[test]
    fn parses_timestamp_with_offset() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 6, 45, 0).unwrap();
        assert_eq!(normalize_date("2024-03-15T08:45:00+0200", reference()), Some(expected));
        assert_eq!(normalize_date("2024-03-15T08:45:00+02:00", reference()), Some(expected));
    }

    #[test]
    fn parses_month_name_and_year() {
        assert_eq!(normalize_date("March 2024", reference()), Some(ymd(2024, 3, 1)));
        assert_eq!(normalize_date("december 2019", reference()), Some(ymd(2019, 12, 1)));
    }

    #[test]
    fn parses_bare_year() {
        assert_eq!(normalize_date("2019", reference()), Some(ymd(2019, 1, 1)));
    }

    #[test]
    fn resolves_relative_dates_against_reference() {
        assert_eq!(
            normalize_date("2 weeks ago", reference()),
            Some(reference() - Duration::days(14))
        );
        assert_eq!(
            normalize_date("1 Day ago", reference()),
            Some(reference() - Duration::days(1))
        );
        assert_eq!(
            normalize_date("3 months ago", reference()),
            Some(reference() - Duration::days(90))
        );
        assert_eq!(
            normalize_date("2 years ago", reference()),
            Some(reference() - Duration::days(730))
        );
    }

    #[test]
    fn relative_dates_are_stable_for_a_fixed_reference() {
        let first = normalize_date("5 days ago", reference());
        let second = normalize_date("5 days ago", reference());
        assert_eq!(first, second);
    }

    #[test]
    fn unparseable_inputs_are_absent() {
        assert_eq!(normalize_date("not a date", reference()), None);
        assert_eq!(normalize_date("", reference()), None);
        assert_eq!(normalize_date("2024-13-45", reference()), None);
        assert_eq!(normalize_date("Smarch 2024", reference()), None);
    }

    #[test]
    fn overflowing_relative_dates_are_absent() {
        assert_eq!(normalize_date("99999999999999 years ago", reference()), None);
    }

    #[test]
    fn window_start_subtracts_whole_days() {
        assert_eq!(window_start(reference(), 90), reference() - Duration::days(90));
        assert_eq!(window_start(reference(), 0), reference());
    }
}
