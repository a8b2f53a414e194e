//! parabot-notify: "your class just started" reminders.
//!
//! A minute-cadence scheduler that announces the start of the day's
//! second-to-last and last lessons, each at most once per calendar day.

pub mod scheduler;

use chrono::NaiveDate;

/// Which lesson start a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Second-to-last lesson (or the only one on a single-lesson day).
    SecondToLast,
    /// Last lesson of the day.
    Last,
}

/// A reminder ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub trigger: Trigger,
    /// Day the reminder belongs to.
    pub date: NaiveDate,
    pub text: String,
}

pub use scheduler::{DedupState, NotificationScheduler};
