//! Week parity resolution.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::catalog::{Catalog, Lesson};

/// Which of the two alternating week tables applies to a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekParity {
    First,
    Second,
}

impl WeekParity {
    /// 1 or 2.
    pub fn number(self) -> u8 {
        match self {
            WeekParity::First => 1,
            WeekParity::Second => 2,
        }
    }
}

impl fmt::Display for WeekParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-я неделя", self.number())
    }
}

/// 2026-02-02, a Monday, starts week 1.
pub fn default_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).expect("valid anchor date")
}

/// Parity of the week containing `date`, counting whole weeks from `anchor`.
///
/// Uses floor division so dates before the anchor keep alternating.
pub fn week_parity(anchor: NaiveDate, date: NaiveDate) -> WeekParity {
    let week_index = (date - anchor).num_days().div_euclid(7);
    if week_index.rem_euclid(2) == 0 {
        WeekParity::First
    } else {
        WeekParity::Second
    }
}

/// A date resolved against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedDay<'a> {
    pub date: NaiveDate,
    pub parity: WeekParity,
    pub weekday: Weekday,
    pub lessons: &'a [Lesson],
}

impl Catalog {
    pub fn week_parity(&self, date: NaiveDate) -> WeekParity {
        week_parity(self.anchor, date)
    }

    /// Week number of `date`: 1 or 2.
    pub fn week_type(&self, date: NaiveDate) -> u8 {
        self.week_parity(date).number()
    }

    /// Lessons on `date`, empty if the weekday has none.
    pub fn lessons_for_date(&self, date: NaiveDate) -> &[Lesson] {
        self.resolve(date).lessons
    }

    pub fn resolve(&self, date: NaiveDate) -> ResolvedDay<'_> {
        let parity = self.week_parity(date);
        let weekday = date.weekday();
        ResolvedDay {
            date,
            parity,
            weekday,
            lessons: self.week(parity).day(weekday),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::catalog::tests::t;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_anchor_scenario() {
        let anchor = default_anchor();
        assert_eq!(week_parity(anchor, d(2026, 2, 2)).number(), 1);
        assert_eq!(week_parity(anchor, d(2026, 2, 8)).number(), 1);
        assert_eq!(week_parity(anchor, d(2026, 2, 9)).number(), 2);
        assert_eq!(week_parity(anchor, d(2026, 2, 16)).number(), 1);
    }

    #[test]
    fn test_before_anchor_keeps_alternating() {
        let anchor = default_anchor();
        // The Sunday before the anchor belongs to week index -1.
        assert_eq!(week_parity(anchor, d(2026, 2, 1)), WeekParity::Second);
        assert_eq!(week_parity(anchor, d(2026, 1, 26)), WeekParity::Second);
        assert_eq!(week_parity(anchor, d(2026, 1, 25)), WeekParity::First);
    }

    #[test]
    fn test_periodicity_and_alternation() {
        let anchor = default_anchor();
        let mut date = d(2024, 1, 1);
        while date < d(2028, 12, 31) {
            let parity = week_parity(anchor, date);
            assert!(matches!(parity.number(), 1 | 2));
            assert_eq!(parity, week_parity(anchor, date + Duration::days(14)));
            assert_ne!(parity, week_parity(anchor, date + Duration::days(7)));
            date += Duration::days(3);
        }
    }

    #[test]
    fn test_lessons_for_date() {
        let mut catalog = Catalog::default();
        catalog
            .week1
            .day_mut(Weekday::Mon)
            .push(Lesson::new("A", t(9, 0), t(10, 30)));
        catalog
            .week2
            .day_mut(Weekday::Mon)
            .push(Lesson::new("B", t(11, 0), t(12, 30)));

        assert_eq!(catalog.lessons_for_date(d(2026, 2, 2))[0].title, "A");
        assert_eq!(catalog.lessons_for_date(d(2026, 2, 9))[0].title, "B");
        assert!(catalog.lessons_for_date(d(2026, 2, 3)).is_empty());

        assert_eq!(catalog.week_type(d(2026, 2, 9)), 2);

        let day = catalog.resolve(d(2026, 2, 16));
        assert_eq!(day.parity, WeekParity::First);
        assert_eq!(day.weekday, Weekday::Mon);
        assert_eq!(day.lessons.len(), 1);
    }

    #[test]
    fn test_far_dates_are_total() {
        let catalog = Catalog::default();
        assert!(catalog.lessons_for_date(d(1900, 1, 1)).is_empty());
        assert!(catalog.lessons_for_date(d(2300, 12, 31)).is_empty());
    }

    #[test]
    fn test_parity_display() {
        assert_eq!(WeekParity::Second.to_string(), "2-я неделя");
    }
}
