//! Lesson catalog: two alternating week tables plus the week anchor.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::week::{self, WeekParity};

/// Monday through Sunday, in table order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A single class on a given weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Lesson {
    pub fn new(title: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }

    /// "09:00–10:30"
    pub fn span(&self) -> String {
        format!("{}–{}", hhmm::show(self.start), hhmm::show(self.end))
    }
}

/// One week of lessons. A missing day means no classes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Week {
    pub monday: Vec<Lesson>,
    pub tuesday: Vec<Lesson>,
    pub wednesday: Vec<Lesson>,
    pub thursday: Vec<Lesson>,
    pub friday: Vec<Lesson>,
    pub saturday: Vec<Lesson>,
    pub sunday: Vec<Lesson>,
}

impl Week {
    pub fn day(&self, weekday: Weekday) -> &[Lesson] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut Vec<Lesson> {
        match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    /// Total number of lessons across the week.
    pub fn lesson_count(&self) -> usize {
        WEEKDAYS.iter().map(|d| self.day(*d).len()).sum()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("week {week}, {day}: lesson \"{title}\" does not end after it starts")]
    EmptyInterval {
        week: u8,
        day: Weekday,
        title: String,
    },
    #[error("week {week}, {day}: lesson \"{title}\" starts before the previous one ends")]
    Overlap {
        week: u8,
        day: Weekday,
        title: String,
    },
}

/// The full static timetable: anchor date plus both week tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Monday that starts week 1 (index 0).
    #[serde(default = "week::default_anchor")]
    pub anchor: NaiveDate,
    #[serde(default)]
    pub week1: Week,
    #[serde(default)]
    pub week2: Week,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            anchor: week::default_anchor(),
            week1: Week::default(),
            week2: Week::default(),
        }
    }
}

impl Catalog {
    pub fn week(&self, parity: WeekParity) -> &Week {
        match parity {
            WeekParity::First => &self.week1,
            WeekParity::Second => &self.week2,
        }
    }

    /// Check that every day's lessons are well-formed, sorted and disjoint.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for parity in [WeekParity::First, WeekParity::Second] {
            let table = self.week(parity);
            for day in WEEKDAYS {
                let mut prev_end: Option<NaiveTime> = None;
                for lesson in table.day(day) {
                    if lesson.start >= lesson.end {
                        return Err(CatalogError::EmptyInterval {
                            week: parity.number(),
                            day,
                            title: lesson.title.clone(),
                        });
                    }
                    if prev_end.is_some_and(|end| lesson.start < end) {
                        return Err(CatalogError::Overlap {
                            week: parity.number(),
                            day,
                            title: lesson.title.clone(),
                        });
                    }
                    prev_end = Some(lesson.end);
                }
            }
        }
        Ok(())
    }
}

/// `HH:MM` (de)serialization for lesson times.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn show(time: NaiveTime) -> String {
        time.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}
