//! Telegram long-polling loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parabot_types::InboundMessage;

use crate::api::TelegramApi;
use crate::types::{GetUpdatesParams, MessageEntity, TgMessage};

/// Seconds Telegram may hold a `getUpdates` request open.
const POLL_TIMEOUT_SECS: i64 = 30;
const MIN_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Command name when the message starts with a bot command entity.
///
/// `/today@para_bot extra` → `today`.
pub fn command_name(text: &str, entities: &[MessageEntity]) -> Option<String> {
    let starts_with_command = entities
        .iter()
        .any(|e| e.entity_type == "bot_command" && e.offset == 0);
    if !starts_with_command {
        return None;
    }
    let name = text
        .split_whitespace()
        .next()?
        .trim_start_matches('/')
        .split('@')
        .next()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Convert a Telegram message; non-text messages are skipped.
pub fn to_inbound(msg: TgMessage, channel_id: &str) -> Option<InboundMessage> {
    let text = msg.text?;
    let command = command_name(&text, &msg.entities);
    let sender_id = msg.from.as_ref().map(|u| u.id).unwrap_or(msg.chat.id);
    let sender_name = msg.from.as_ref().map(|u| u.display_name());

    Some(InboundMessage {
        channel_type: "telegram".into(),
        channel_id: channel_id.to_string(),
        sender_id,
        sender_name,
        chat_id: msg.chat.id,
        text,
        command,
        timestamp: msg.date * 1000,
    })
}

/// Run the long-polling loop, converting Telegram updates to `InboundMessage`.
///
/// Exits when `cancel` is cancelled or the `sender` is closed.
pub async fn run_polling_loop(
    api: &TelegramApi,
    channel_id: String,
    sender: mpsc::Sender<InboundMessage>,
    cancel: CancellationToken,
) {
    let mut offset: Option<i64> = None;
    let mut backoff = MIN_BACKOFF;

    info!(channel_id, "Telegram polling loop started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let params = GetUpdatesParams {
            offset,
            timeout: Some(POLL_TIMEOUT_SECS),
            allowed_updates: Some(vec!["message".into()]),
        };

        let updates = tokio::select! {
            _ = cancel.cancelled() => break,
            result = api.get_updates(&params) => result,
        };

        match updates {
            Ok(updates) => {
                backoff = MIN_BACKOFF;

                for update in updates {
                    offset = Some(update.update_id + 1);

                    let Some(inbound) = update
                        .message
                        .and_then(|msg| to_inbound(msg, &channel_id))
                    else {
                        continue;
                    };

                    debug!(
                        channel_id,
                        update_id = update.update_id,
                        command = inbound.command.as_deref().unwrap_or(""),
                        "Forwarding Telegram message"
                    );

                    if sender.send(inbound).await.is_err() {
                        info!(channel_id, "Inbound channel closed, stopping polling");
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(
                    channel_id,
                    backoff_secs = backoff.as_secs(),
                    "getUpdates error: {e}"
                );

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {},
                }

                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }

    info!(channel_id, "Telegram polling loop stopped");
}
