//! Free-text date parsing: "23.02", "23-02-26", "23/02/2026", "23 февраля 2026".

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[./\-](\d{1,2})(?:[./\-](\d{4}|\d{2}))?\b").expect("valid regex")
});

static MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})\s+([а-яё]+)(?:\s+(\d{4}|\d{2}))?\b").expect("valid regex")
});

/// Month number for a Russian month name, genitive or nominative.
fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "января" | "январь" => 1,
        "февраля" | "февраль" => 2,
        "марта" | "март" => 3,
        "апреля" | "апрель" => 4,
        "мая" | "май" => 5,
        "июня" | "июнь" => 6,
        "июля" | "июль" => 7,
        "августа" | "август" => 8,
        "сентября" | "сентябрь" => 9,
        "октября" | "октябрь" => 10,
        "ноября" | "ноябрь" => 11,
        "декабря" | "декабрь" => 12,
        _ => return None,
    };
    Some(month)
}

/// Two-digit years are in the 2000s; a missing year is the reference year.
fn resolve_year(raw: Option<&str>, reference: NaiveDate) -> Option<i32> {
    match raw {
        None => Some(reference.year()),
        Some(digits) => {
            let year: i32 = digits.parse().ok()?;
            Some(if digits.len() == 2 { year + 2000 } else { year })
        }
    }
}

/// Parse a date out of free text, relative to `reference` (today).
///
/// Numeric forms win over month names. Returns `None` when nothing matches,
/// the month name is unknown, or the day does not exist in that month.
pub fn parse_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();

    if let Some(caps) = NUMERIC.captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = resolve_year(caps.get(3).map(|m| m.as_str()), reference)?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = MONTH_NAME.captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = resolve_year(caps.get(3).map(|m| m.as_str()), reference)?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> NaiveDate {
        d(2026, 10, 18)
    }

    #[test]
    fn test_numeric_and_month_name_agree() {
        let expected = Some(d(2026, 2, 23));
        assert_eq!(parse_date("23.02.2026", today()), expected);
        assert_eq!(parse_date("23 февраля 2026", today()), expected);
        assert_eq!(parse_date("23 Февраль 2026", d(1999, 1, 1)), expected);
    }

    #[test]
    fn test_numeric_separators_and_years() {
        assert_eq!(parse_date("1/9", today()), Some(d(2026, 9, 1)));
        assert_eq!(parse_date("01-09-27", today()), Some(d(2027, 9, 1)));
        assert_eq!(parse_date("5.3.2030", today()), Some(d(2030, 3, 5)));
        assert_eq!(parse_date("пары на 23.02?", today()), Some(d(2026, 2, 23)));
    }

    #[test]
    fn test_month_name_defaults_year() {
        assert_eq!(parse_date("  7 мая ", today()), Some(d(2026, 5, 7)));
        assert_eq!(parse_date("что 1 сентября 27", today()), Some(d(2027, 9, 1)));
        assert_eq!(parse_date("31 декабря", today()), Some(d(2026, 12, 31)));
    }

    #[test]
    fn test_invalid_calendar_dates_rejected() {
        assert_eq!(parse_date("31.02.2026", today()), None);
        assert_eq!(parse_date("31 апреля", today()), None);
        assert_eq!(parse_date("29.02.2027", today()), None);
        assert_eq!(parse_date("12.13", today()), None);
        assert_eq!(parse_date("0.1", today()), None);
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(parse_date("29.02.2028", today()), Some(d(2028, 2, 29)));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(parse_date("", today()), None);
        assert_eq!(parse_date("какая сейчас пара", today()), None);
        assert_eq!(parse_date("23 брюмера", today()), None);
        assert_eq!(parse_date("23", today()), None);
    }
}
