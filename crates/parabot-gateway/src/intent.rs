//! What the user is asking for.
//!
//! Commands map directly; free text goes through [`TEXT_RULES`] in order and
//! the first rule that answers wins.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use parabot_schedule::parse_date;
use parabot_types::Keyboard;

pub const BUTTON_TODAY: &str = "📅 Сегодня";
pub const BUTTON_TOMORROW: &str = "➡️ Завтра";
pub const BUTTON_DATE: &str = "🗓 Ввести дату";
pub const BUTTON_WEEK: &str = "📆 Неделя";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    Help,
    Today,
    Tomorrow,
    Week,
    /// Prompt for a date typed as text.
    AskDate,
    Date(NaiveDate),
    Unknown,
}

/// The reply keyboard attached to every answer.
pub fn keyboard() -> Keyboard {
    Keyboard {
        rows: vec![
            vec![BUTTON_TODAY.to_string(), BUTTON_TOMORROW.to_string()],
            vec![BUTTON_DATE.to_string(), BUTTON_WEEK.to_string()],
        ],
    }
}

/// Bot commands, without the leading slash.
pub fn command_intent(name: &str) -> Intent {
    match name.to_lowercase().as_str() {
        "start" => Intent::Start,
        "help" => Intent::Help,
        "today" => Intent::Today,
        "tomorrow" => Intent::Tomorrow,
        "week" => Intent::Week,
        "date" => Intent::AskDate,
        _ => Intent::Unknown,
    }
}

/// Lowercase and collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A named free-text rule. Receives normalized text and today's date.
pub type Rule = (&'static str, fn(&str, NaiveDate) -> Option<Intent>);

/// Free-text rules, highest priority first.
pub const TEXT_RULES: &[Rule] = &[
    ("button", button_rule),
    ("tomorrow", tomorrow_rule),
    ("week", week_rule),
    ("date", date_rule),
    ("today", today_rule),
];

fn button_rule(text: &str, _today: NaiveDate) -> Option<Intent> {
    [
        (BUTTON_TODAY, Intent::Today),
        (BUTTON_TOMORROW, Intent::Tomorrow),
        (BUTTON_DATE, Intent::AskDate),
        (BUTTON_WEEK, Intent::Week),
    ]
    .into_iter()
    .find(|(label, _)| normalize_text(label) == text)
    .map(|(_, intent)| intent)
}

fn tomorrow_rule(text: &str, _today: NaiveDate) -> Option<Intent> {
    text.contains("завтра").then_some(Intent::Tomorrow)
}

/// Whole word forms of "неделя"; "понедельник" must not match.
static WEEK_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bнедел(?:я|ю|и|е|ей|ям|ях|ями)\b").expect("valid regex")
});

fn week_rule(text: &str, _today: NaiveDate) -> Option<Intent> {
    WEEK_WORD.is_match(text).then_some(Intent::Week)
}

const TODAY_PHRASES: &[&str] = &[
    "сегодня",
    "сейчас",
    "сколько пар",
    "какая пара",
];

fn today_rule(text: &str, _today: NaiveDate) -> Option<Intent> {
    TODAY_PHRASES
        .iter()
        .any(|p| text.contains(p))
        .then_some(Intent::Today)
}

fn date_rule(text: &str, today: NaiveDate) -> Option<Intent> {
    parse_date(text, today).map(Intent::Date)
}

/// Classify free text, returning the intent and the name of the rule that matched.
pub fn classify_text(text: &str, today: NaiveDate) -> (Intent, Option<&'static str>) {
    let text = normalize_text(text);
    for (name, rule) in TEXT_RULES {
        if let Some(intent) = rule(&text, today) {
            return (intent, Some(*name));
        }
    }
    (Intent::Unknown, None)
}
