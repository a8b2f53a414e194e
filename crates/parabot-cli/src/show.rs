//! Offline views printed by `parabot show` and `parabot check`.

use chrono::{Duration, NaiveDateTime};

use parabot_config::ScheduleSettings;
use parabot_gateway::handlers::WEEK_SPAN;
use parabot_schedule::{Catalog, format_day, format_week, parse_date};

/// Render `what` (today, tomorrow, week or a date) as the bot would.
pub fn render(catalog: &Catalog, now: NaiveDateTime, what: &str) -> Option<String> {
    let today = now.date();
    let text = match what.trim().to_lowercase().as_str() {
        "" | "today" => format_day(catalog, now, today),
        "tomorrow" => format_day(catalog, now, today + Duration::days(1)),
        "week" => format_week(catalog, now, today, WEEK_SPAN),
        other => format_day(catalog, now, parse_date(other, today)?),
    };
    Some(text)
}

/// Configuration summary for `parabot check`.
pub fn summary(settings: &ScheduleSettings, catalog: &Catalog, now: NaiveDateTime) -> String {
    let today = now.date();
    format!(
        "schedule: {}\n\
         timezone: {}\n\
         anchor: {}\n\
         today: {} ({})\n\
         lessons: week 1 = {}, week 2 = {}",
        settings.schedule_path.display(),
        settings.timezone.name(),
        catalog.anchor,
        today.format("%d.%m.%Y"),
        catalog.week_parity(today),
        catalog.week1.lesson_count(),
        catalog.week2.lesson_count(),
    )
}
