//! parabot-gateway: wires the chat channel, the dispatcher and the
//! notification scheduler into one running bot.
//!
//! Provides:
//! - Channel plugin trait with typed delivery errors
//! - Ordered free-text intent rules
//! - Single-user dispatcher for the today / tomorrow / date / week views
//! - The runtime loop that also delivers scheduled reminders

pub mod channel;
pub mod handlers;
pub mod intent;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDateTime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use parabot_config::BotConfig;
use parabot_notify::NotificationScheduler;
use parabot_schedule::Catalog;
use parabot_types::OutboundMessage;

use channel::{ChannelPlugin, spawn_delivery};
use handlers::Dispatcher;

/// Inbound queue capacity between the channel listener and the dispatcher.
const INBOUND_BUFFER: usize = 64;

/// Run the bot until Ctrl-C.
pub async fn run_bot(
    config: BotConfig,
    catalog: Catalog,
    channel: Arc<dyn ChannelPlugin>,
) -> anyhow::Result<()> {
    let settings = config.schedule.clone();
    let clock = move || settings.now();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    run_until(config, catalog, channel, clock, shutdown).await
}

/// Run the bot until `shutdown` resolves, reading local time from `clock`.
///
/// Messages are answered one at a time in arrival order; every send runs on
/// its own task so a slow platform never stalls the loop or the reminder ticks.
pub async fn run_until<C, S>(
    config: BotConfig,
    catalog: Catalog,
    channel: Arc<dyn ChannelPlugin>,
    clock: C,
    shutdown: S,
) -> anyhow::Result<()>
where
    C: Fn() -> NaiveDateTime + Clone + Send + 'static,
    S: Future<Output = ()>,
{
    let catalog = Arc::new(catalog);
    let dispatcher = Dispatcher::new(
        catalog.clone(),
        config.allowed_user_id,
        config.schedule.timezone.name(),
    );
    let scheduler = Arc::new(NotificationScheduler::new(catalog));

    let (inbound_tx, mut inbound_rx) = mpsc::channel(INBOUND_BUFFER);
    channel
        .start(inbound_tx)
        .await
        .with_context(|| format!("Failed to start channel {}", channel.channel_id()))?;

    let cancel = CancellationToken::new();
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
    let scheduler_handle = tokio::spawn(scheduler.run_scheduler(
        clock.clone(),
        notify_tx,
        cancel.child_token(),
    ));

    info!(
        channel_id = channel.channel_id(),
        zone = config.schedule.timezone.name(),
        "Bot is running"
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            inbound = inbound_rx.recv() => {
                let Some(inbound) = inbound else {
                    warn!("Inbound channel closed");
                    break;
                };
                if let Some(reply) = dispatcher.handle_inbound(&inbound, clock()) {
                    spawn_delivery(channel.clone(), reply, "reply");
                }
            }
            Some(notification) = notify_rx.recv() => {
                let message = OutboundMessage::text(config.allowed_user_id, notification.text);
                spawn_delivery(channel.clone(), message, "notification");
            }
        }
    }

    cancel.cancel();
    if let Err(e) = scheduler_handle.await {
        warn!("Notification scheduler task failed: {e}");
    }
    channel.stop().await?;
    info!("Bot stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveTime, Weekday};
    use parabot_config::ScheduleSettings;
    use parabot_schedule::Lesson;
    use parabot_types::{ChannelStatus, InboundMessage};
    use tokio::sync::oneshot;

    use super::*;
    use crate::channel::tests::MockChannel;

    const OWNER: i64 = 42;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn config() -> BotConfig {
        BotConfig {
            bot_token: "123:ABC".into(),
            allowed_user_id: OWNER,
            schedule: ScheduleSettings {
                timezone: chrono_tz::Asia::Novosibirsk,
                schedule_path: PathBuf::from("schedule.json5"),
            },
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        let mon = catalog.week1.day_mut(Weekday::Mon);
        mon.push(Lesson::new("A", t(9, 0), t(10, 30)));
        mon.push(Lesson::new("B", t(10, 45), t(12, 15)));
        catalog
    }

    fn inbound(sender_id: i64, text: &str) -> InboundMessage {
        InboundMessage {
            channel_type: "mock".into(),
            channel_id: "mock-1".into(),
            sender_id,
            sender_name: None,
            chat_id: sender_id,
            text: text.into(),
            command: None,
            timestamp: 0,
        }
    }

    async fn wait_for_sent(ch: &MockChannel, count: usize) {
        for _ in 0..100 {
            if ch.sent_messages.lock().await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("expected {count} sent messages");
    }

    #[tokio::test(start_paused = true)]
    async fn test_answers_owner_and_delivers_reminder() {
        let ch = Arc::new(MockChannel::new());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        // Start of the last lesson on a week-1 Monday.
        let now = NaiveDate::from_ymd_opt(2026, 2, 2)
            .unwrap()
            .and_time(t(10, 45));

        let bot = tokio::spawn(run_until(
            config(),
            catalog(),
            ch.clone(),
            move || now,
            async move {
                let _ = stop_rx.await;
            },
        ));

        let sender = loop {
            if let Some(sender) = ch.inbound_sender() {
                break sender;
            }
            tokio::task::yield_now().await;
        };
        sender.send(inbound(7, "сегодня")).await.unwrap();
        sender.send(inbound(OWNER, "сегодня")).await.unwrap();

        // One reply to the owner, then the reminder once the first tick fires.
        wait_for_sent(&ch, 2).await;
        {
            let sent = ch.sent_messages.lock().await;
            assert!(sent.iter().all(|m| m.chat_id == OWNER));
            assert!(sent.iter().any(|m| m.text.contains("идёт 2-я пара")));
            assert!(
                sent.iter()
                    .any(|m| m.text.starts_with("🔔 Началась последняя пара"))
            );
        }

        stop_tx.send(()).unwrap();
        bot.await.unwrap().unwrap();
        assert_eq!(ch.status(), ChannelStatus::Stopped);
        assert_eq!(ch.sent_messages.lock().await.len(), 2);
    }
}
