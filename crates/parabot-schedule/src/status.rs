//! Live status of a day: which lesson is on, how many are left.

use std::fmt;

use chrono::NaiveTime;

use crate::catalog::{Lesson, hhmm};

/// Where the current time falls relative to a day's lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayPhase {
    /// No lessons at all today.
    NoClasses,
    /// Before the first lesson.
    NotStartedYet { first_start: NaiveTime },
    /// Inside lesson `index` (1-based). Both bounds are inclusive.
    InProgress {
        index: usize,
        start: NaiveTime,
        end: NaiveTime,
        title: String,
    },
    /// Between two lessons; `next_index` is 1-based.
    Break {
        next_index: usize,
        next_start: NaiveTime,
    },
    /// After the last lesson.
    Finished { last_end: NaiveTime },
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPhase::NoClasses => write!(f, "сегодня пар нет"),
            DayPhase::NotStartedYet { first_start } => {
                write!(f, "пары ещё не начались (первая в {})", hhmm::show(*first_start))
            }
            DayPhase::InProgress {
                index,
                start,
                end,
                title,
            } => write!(
                f,
                "идёт {index}-я пара ({}–{}): {title}",
                hhmm::show(*start),
                hhmm::show(*end)
            ),
            DayPhase::Break {
                next_index,
                next_start,
            } => write!(
                f,
                "сейчас перерыв/окно, следующая {next_index}-я в {}",
                hhmm::show(*next_start)
            ),
            DayPhase::Finished { last_end } => {
                write!(f, "пары закончились (последняя до {})", hhmm::show(*last_end))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStatus {
    /// Lessons not yet finished, counting the one in progress.
    pub remaining: usize,
    pub phase: DayPhase,
}

/// Classify `now` against a sorted, non-overlapping list of lessons.
pub fn analyze_day(now: NaiveTime, lessons: &[Lesson]) -> DayStatus {
    let (Some(first), Some(last)) = (lessons.first(), lessons.last()) else {
        return DayStatus {
            remaining: 0,
            phase: DayPhase::NoClasses,
        };
    };
    let total = lessons.len();

    if now < first.start {
        return DayStatus {
            remaining: total,
            phase: DayPhase::NotStartedYet {
                first_start: first.start,
            },
        };
    }

    for (i, lesson) in lessons.iter().enumerate() {
        let index = i + 1;
        if lesson.start <= now && now <= lesson.end {
            return DayStatus {
                remaining: total - i,
                phase: DayPhase::InProgress {
                    index,
                    start: lesson.start,
                    end: lesson.end,
                    title: lesson.title.clone(),
                },
            };
        }
        if let Some(next) = lessons.get(index) {
            if lesson.end < now && now < next.start {
                return DayStatus {
                    remaining: total - index,
                    phase: DayPhase::Break {
                        next_index: index + 1,
                        next_start: next.start,
                    },
                };
            }
        }
    }

    DayStatus {
        remaining: 0,
        phase: DayPhase::Finished {
            last_end: last.end,
        },
    }
}
