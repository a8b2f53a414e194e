//! Text views of the schedule.

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::catalog::{Catalog, Lesson};
use crate::status::analyze_day;
use crate::week::ResolvedDay;

pub const DAYS_RU: [&str; 7] = [
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
    "Воскресенье",
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    DAYS_RU[weekday.num_days_from_monday() as usize]
}

fn header(day: &ResolvedDay<'_>) -> String {
    format!(
        "📅 {}, {} — {}",
        weekday_name(day.weekday),
        day.date.format("%d.%m.%Y"),
        day.parity
    )
}

fn push_listing(lines: &mut Vec<String>, lessons: &[Lesson]) {
    for (idx, lesson) in lessons.iter().enumerate() {
        lines.push(format!("{}) {} — {}", idx + 1, lesson.span(), lesson.title));
    }
}

/// Schedule for `target`. Today gets the live status, other dates a plain list.
pub fn format_day(catalog: &Catalog, now: NaiveDateTime, target: NaiveDate) -> String {
    let day = catalog.resolve(target);

    if day.lessons.is_empty() {
        return format!("{}\n🏖️ Пар нет", header(&day));
    }

    if target == now.date() {
        let status = analyze_day(now.time(), day.lessons);
        return format!(
            "{}\n📚 Всего пар сегодня: {}\n▶️ Сейчас: {}\n⏳ Осталось пар: {}",
            header(&day),
            day.lessons.len(),
            status.phase,
            status.remaining
        );
    }

    let mut lines = vec![
        header(&day),
        format!("📚 Всего пар: {}", day.lessons.len()),
        String::new(),
    ];
    push_listing(&mut lines, day.lessons);
    lines.join("\n")
}

/// Plain listings for `span` consecutive days starting at `start`.
pub fn format_week(catalog: &Catalog, now: NaiveDateTime, start: NaiveDate, span: usize) -> String {
    let mut blocks = Vec::with_capacity(span);
    for offset in 0..span {
        let date = start + Duration::days(offset as i64);
        let day = catalog.resolve(date);
        let today = if date == now.date() { " (сегодня)" } else { "" };

        let mut lines = vec![format!(
            "📅 {} {}{} — {}",
            weekday_name(day.weekday),
            date.format("%d.%m"),
            today,
            day.parity
        )];
        if day.lessons.is_empty() {
            lines.push("🏖️ Пар нет".to_string());
        } else {
            push_listing(&mut lines, day.lessons);
        }
        blocks.push(lines.join("\n"));
    }

    let end = start + Duration::days(span.saturating_sub(1) as i64);
    format!(
        "🗓 Расписание {} – {}\n\n{}",
        start.format("%d.%m"),
        end.format("%d.%m"),
        blocks.join("\n\n")
    )
}
