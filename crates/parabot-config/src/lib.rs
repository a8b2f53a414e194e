//! parabot-config: environment settings and the JSON5 lesson catalog.

use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use parabot_schedule::{Catalog, CatalogError};

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const ALLOWED_USER_VAR: &str = "ALLOWED_USER_ID";
pub const TIMEZONE_VAR: &str = "TZ";
pub const SCHEDULE_VAR: &str = "PARABOT_SCHEDULE";

pub const DEFAULT_TIMEZONE: &str = "Asia/Novosibirsk";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
    #[error("Schedule file not found at {0}")]
    ScheduleNotFound(PathBuf),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] CatalogError),
    #[error("TELEGRAM_BOT_TOKEN is empty")]
    MissingToken,
    #[error("ALLOWED_USER_ID is empty")]
    MissingAllowedUser,
    #[error("ALLOWED_USER_ID is not a user id: {0}")]
    InvalidAllowedUser(String),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Where the timetable lives and which zone its times are in.
#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    /// Zone every lesson time is interpreted in.
    pub timezone: Tz,
    /// JSON5 file with the two week tables.
    pub schedule_path: PathBuf,
}

impl ScheduleSettings {
    /// Read settings through `lookup` (normally the process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tz_name = non_empty(lookup(TIMEZONE_VAR)).unwrap_or_else(|| DEFAULT_TIMEZONE.into());
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(tz_name.clone()))?;

        let schedule_path = match non_empty(lookup(SCHEDULE_VAR)) {
            Some(path) => PathBuf::from(path),
            None => schedule_file_path()?,
        };

        Ok(Self {
            timezone,
            schedule_path,
        })
    }

    /// Current wall-clock time in the configured zone.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }
}

/// Everything the bot needs to run.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// The only Telegram user the bot talks to.
    pub allowed_user_id: i64,
    pub schedule: ScheduleSettings,
}

impl BotConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = non_empty(lookup(TOKEN_VAR)).ok_or(ConfigError::MissingToken)?;

        let allowed_user_id = match non_empty(lookup(ALLOWED_USER_VAR)) {
            None => return Err(ConfigError::MissingAllowedUser),
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidAllowedUser(raw.clone()))?,
        };
        if allowed_user_id == 0 {
            return Err(ConfigError::MissingAllowedUser);
        }

        Ok(Self {
            bot_token,
            allowed_user_id,
            schedule: ScheduleSettings::from_lookup(lookup)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve the parabot config directory (~/.parabot/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".parabot"))
        .ok_or(ConfigError::NoDirFound)
}

/// Default schedule location (~/.parabot/schedule.json5).
pub fn schedule_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("schedule.json5"))
}

/// Load `.env` if present, then read schedule settings from the environment.
pub fn load_schedule_settings() -> Result<ScheduleSettings, ConfigError> {
    let _ = dotenvy::dotenv();
    ScheduleSettings::from_lookup(env_lookup)
}

/// Load `.env` if present, then read the full bot configuration.
pub fn load_bot_config() -> Result<BotConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    BotConfig::from_lookup(env_lookup)
}

/// Load and validate the lesson catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ScheduleNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&content)?;
    tracing::debug!(
        path = %path.display(),
        week1 = catalog.week1.lesson_count(),
        week2 = catalog.week2.lesson_count(),
        "Schedule loaded"
    );
    Ok(catalog)
}

/// Parse and validate a catalog from JSON5 text.
pub fn parse_catalog(content: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = json5::from_str(content)?;
    catalog.validate()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_bot_config_from_env() {
        let config = BotConfig::from_lookup(lookup(&[
            (TOKEN_VAR, " 123:ABC "),
            (ALLOWED_USER_VAR, "42"),
            (TIMEZONE_VAR, "Europe/Moscow"),
            (SCHEDULE_VAR, "/tmp/schedule.json5"),
        ]))
        .unwrap();
        assert_eq!(config.bot_token, "123:ABC");
        assert_eq!(config.allowed_user_id, 42);
        assert_eq!(config.schedule.timezone, chrono_tz::Europe::Moscow);
        assert_eq!(config.schedule.schedule_path, PathBuf::from("/tmp/schedule.json5"));
    }

    #[test]
    fn test_timezone_default() {
        let settings =
            ScheduleSettings::from_lookup(lookup(&[(SCHEDULE_VAR, "s.json5")])).unwrap();
        assert_eq!(settings.timezone, chrono_tz::Asia::Novosibirsk);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = BotConfig::from_lookup(lookup(&[(TOKEN_VAR, "  "), (ALLOWED_USER_VAR, "42")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_allowed_user_errors() {
        let err = BotConfig::from_lookup(lookup(&[(TOKEN_VAR, "t")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAllowedUser));

        let err = BotConfig::from_lookup(lookup(&[(TOKEN_VAR, "t"), (ALLOWED_USER_VAR, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingAllowedUser));

        let err = BotConfig::from_lookup(lookup(&[(TOKEN_VAR, "t"), (ALLOWED_USER_VAR, "me")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAllowedUser(ref raw) if raw == "me"));
    }

    #[test]
    fn test_unknown_timezone() {
        let err = ScheduleSettings::from_lookup(lookup(&[
            (TIMEZONE_VAR, "Mars/Olympus"),
            (SCHEDULE_VAR, "s.json5"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown timezone: Mars/Olympus");
    }

    #[test]
    fn test_parse_catalog_validates() {
        let src = r#"{
            week1: {
                monday: [
                    { title: "A", start: "10:00", end: "11:30" },
                    { title: "B", start: "11:00", end: "12:30" },
                ],
            },
        }"#;
        let err = parse_catalog(src).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchedule(_)));
    }

    #[test]
    fn test_sample_schedule_is_valid() {
        let catalog = parse_catalog(include_str!("../../../config/schedule.example.json5")).unwrap();
        assert_eq!(catalog.anchor, NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        assert!(catalog.week1.lesson_count() > 0);
        assert!(catalog.week2.lesson_count() > 0);
    }

    #[test]
    fn test_missing_schedule_file() {
        let err = load_catalog(Path::new("/nonexistent/parabot/schedule.json5")).unwrap_err();
        assert!(matches!(err, ConfigError::ScheduleNotFound(_)));
    }
}
