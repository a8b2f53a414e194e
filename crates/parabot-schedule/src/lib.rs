//! parabot-schedule: the temporal schedule engine.
//!
//! Everything here is pure: callers pass the current wall-clock instant in
//! the configured zone, nothing reads the system clock.
//!
//! - [`catalog`]: lessons, week tables and their validation
//! - [`week`]: date → week parity → lessons
//! - [`status`]: where "now" falls relative to a day's lessons
//! - [`format`]: human-readable day and week views
//! - [`date_parser`]: free-text dates ("23.02", "23 февраля 2026")

pub mod catalog;
pub mod date_parser;
pub mod format;
pub mod status;
pub mod week;

pub use catalog::{Catalog, CatalogError, Lesson, Week};
pub use date_parser::parse_date;
pub use format::{format_day, format_week};
pub use status::{DayPhase, DayStatus, analyze_day};
pub use week::WeekParity;
