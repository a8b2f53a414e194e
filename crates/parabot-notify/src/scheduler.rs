//! Notification scheduler: minute ticks against today's lessons.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parabot_schedule::{Catalog, Lesson};

use crate::{Notification, Trigger};

/// How often the scheduler looks at the clock.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Delay before the first tick after start-up.
pub const FIRST_TICK_DELAY: Duration = Duration::from_secs(5);

/// Last day each trigger fired. Never cleared; a stale date simply no longer matches today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupState {
    pub second_to_last: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

/// Decides which reminders are due and remembers what already fired today.
pub struct NotificationScheduler {
    catalog: Arc<Catalog>,
    state: Mutex<DedupState>,
}

fn same_minute(now: NaiveTime, start: NaiveTime) -> bool {
    now.hour() == start.hour() && now.minute() == start.minute()
}

impl NotificationScheduler {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(DedupState::default()),
        }
    }

    /// Snapshot of the dedup state.
    pub async fn state(&self) -> DedupState {
        self.state.lock().await.clone()
    }

    /// Reminders due at `now`, marking each one as sent for today.
    ///
    /// A trigger is marked when it is produced, before delivery is attempted,
    /// so a failed send is not retried on a later tick.
    pub async fn due(&self, now: NaiveDateTime) -> Vec<Notification> {
        let today = now.date();
        let lessons = self.catalog.lessons_for_date(today);
        let (Some(second_to_last), Some(last)) =
            (lessons.get(lessons.len().saturating_sub(2)), lessons.last())
        else {
            return Vec::new();
        };
        let count = lessons.len();
        let time = now.time();

        let mut state = self.state.lock().await;
        let mut due = Vec::new();

        if state.second_to_last != Some(today) && same_minute(time, second_to_last.start) {
            let text = if count == 1 {
                format!(
                    "🔔 Сегодня всего одна пара, и она началась ({}): {}",
                    second_to_last.span(),
                    second_to_last.title
                )
            } else {
                format!(
                    "🔔 Началась {}-я пара ({}): {}\n⏳ После неё останется ещё одна",
                    count - 1,
                    second_to_last.span(),
                    second_to_last.title
                )
            };
            due.push(Notification {
                trigger: Trigger::SecondToLast,
                date: today,
                text,
            });
            state.second_to_last = Some(today);
        }

        if state.last != Some(today) && same_minute(time, last.start) {
            // A single lesson was already announced above.
            if count > 1 {
                due.push(Notification {
                    trigger: Trigger::Last,
                    date: today,
                    text: last_lesson_text(last),
                });
            }
            state.last = Some(today);
        }

        due
    }

    /// Start the scheduler loop (runs in background).
    ///
    /// Every [`TICK_INTERVAL`] asks `clock` for the local time and pushes due
    /// reminders into `sender`. Delivery happens on the receiving side, so a
    /// slow send never delays the next tick.
    pub async fn run_scheduler<C>(
        self: Arc<Self>,
        clock: C,
        sender: mpsc::UnboundedSender<Notification>,
        cancel: CancellationToken,
    ) where
        C: Fn() -> NaiveDateTime + Send + 'static,
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + FIRST_TICK_DELAY, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Notification scheduler started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {},
            }

            let now = clock();
            let due = self.due(now).await;
            debug!(%now, due = due.len(), "Notification tick");

            for notification in due {
                info!(trigger = ?notification.trigger, date = %notification.date, "Reminder due");
                if sender.send(notification).is_err() {
                    warn!("Notification receiver closed, stopping scheduler");
                    return;
                }
            }
        }
        info!("Notification scheduler stopped");
    }
}

fn last_lesson_text(lesson: &Lesson) -> String {
    format!("🔔 Началась последняя пара ({}): {}", lesson.span(), lesson.title)
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, s).unwrap()
    }

    /// 2026-02-02 is a week-1 Monday, 2026-02-03 a week-1 Tuesday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 3).unwrap()
    }

    fn scheduler() -> NotificationScheduler {
        let mut catalog = Catalog::default();
        let mon = catalog.week1.day_mut(Weekday::Mon);
        mon.push(Lesson::new("A", t(9, 0), t(10, 30)));
        mon.push(Lesson::new("B", t(10, 45), t(12, 15)));
        mon.push(Lesson::new("C", t(12, 45), t(14, 15)));
        catalog
            .week1
            .day_mut(Weekday::Tue)
            .push(Lesson::new("Solo", t(11, 0), t(12, 30)));
        let thu = catalog.week1.day_mut(Weekday::Thu);
        thu.push(Lesson::new("Алгебра", t(8, 30), t(10, 0)));
        thu.push(Lesson::new("История", t(10, 15), t(11, 45)));
        NotificationScheduler::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_second_to_last_and_last_fire_once() {
        let sched = scheduler();
        let day = monday();

        assert!(sched.due(at(day, 9, 0, 10)).await.is_empty());

        let due = sched.due(at(day, 10, 45, 3)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].trigger, Trigger::SecondToLast);
        assert!(due[0].text.contains("2-я пара (10:45–12:15): B"));
        assert!(sched.due(at(day, 10, 45, 59)).await.is_empty());

        let due = sched.due(at(day, 12, 45, 30)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].trigger, Trigger::Last);
        assert_eq!(due[0].text, "🔔 Началась последняя пара (12:45–14:15): C");
        assert!(sched.due(at(day, 12, 45, 31)).await.is_empty());

        assert_eq!(
            sched.state().await,
            DedupState {
                second_to_last: Some(day),
                last: Some(day),
            }
        );
    }

    #[tokio::test]
    async fn test_minute_mismatch_does_not_fire() {
        let sched = scheduler();
        assert!(sched.due(at(monday(), 10, 44, 59)).await.is_empty());
        assert!(sched.due(at(monday(), 10, 46, 0)).await.is_empty());
        assert_eq!(sched.state().await, DedupState::default());
    }

    #[tokio::test]
    async fn test_single_lesson_day_sends_one_message() {
        let sched = scheduler();
        let day = tuesday();

        let due = sched.due(at(day, 11, 0, 42)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].trigger, Trigger::SecondToLast);
        assert!(due[0].text.contains("всего одна пара"));
        assert!(sched.due(at(day, 11, 0, 50)).await.is_empty());

        let state = sched.state().await;
        assert_eq!(state.second_to_last, Some(day));
        assert_eq!(state.last, Some(day));
    }

    #[tokio::test]
    async fn test_two_lesson_day_announces_both() {
        let sched = scheduler();
        let thursday = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();

        let due = sched.due(at(thursday, 8, 30, 0)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].trigger, Trigger::SecondToLast);
        assert_eq!(
            due[0].text,
            "🔔 Началась 1-я пара (08:30–10:00): Алгебра\n⏳ После неё останется ещё одна"
        );

        let due = sched.due(at(thursday, 10, 15, 0)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].trigger, Trigger::Last);
        assert_eq!(due[0].text, "🔔 Началась последняя пара (10:15–11:45): История");
    }

    #[tokio::test]
    async fn test_fires_again_on_a_later_day() {
        let sched = scheduler();
        let first = monday();
        let two_weeks_later = first + chrono::Duration::days(14);

        assert_eq!(sched.due(at(first, 12, 45, 0)).await.len(), 1);
        let due = sched.due(at(two_weeks_later, 12, 45, 0)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].date, two_weeks_later);
    }

    #[tokio::test]
    async fn test_empty_day_is_noop() {
        let sched = scheduler();
        let wednesday = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        assert!(sched.due(at(wednesday, 9, 0, 0)).await.is_empty());
        assert_eq!(sched.state().await, DedupState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_scheduler_ticks_and_dedups() {
        let sched = Arc::new(scheduler());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let now = at(monday(), 12, 45, 0);

        let handle = tokio::spawn(sched.clone().run_scheduler(move || now, tx, cancel.clone()));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.trigger, Trigger::Last);

        // Several more ticks inside the same frozen minute produce nothing.
        tokio::time::sleep(TICK_INTERVAL * 3).await;
        assert!(rx.try_recv().is_err());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler should exit promptly on cancel")
            .unwrap();
    }
}
