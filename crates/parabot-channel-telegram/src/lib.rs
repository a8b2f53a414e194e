//! Telegram Bot channel plugin for parabot.
//!
//! Uses Telegram Bot API with long-polling (no webhook required). The bot
//! token comes from `TELEGRAM_BOT_TOKEN`; see `parabot-config`.

pub mod api;
pub mod polling;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use parabot_gateway::channel::{ChannelPlugin, DeliveryError};
use parabot_types::{ChannelStatus, InboundMessage, OutboundMessage};

use api::{ApiError, TelegramApi};
use types::{BotCommand, ReplyKeyboardMarkup, SendMessageParams, SetMyCommandsParams};

/// Commands shown in the Telegram menu.
pub const BOT_COMMANDS: &[(&str, &str)] = &[
    ("start", "Приветствие и кнопки"),
    ("today", "Пары на сегодня"),
    ("tomorrow", "Пары на завтра"),
    ("week", "Расписание на неделю"),
    ("date", "Пары на выбранную дату"),
    ("help", "Что я умею"),
];

/// Telegram channel plugin implementing `ChannelPlugin`.
pub struct TelegramChannel {
    id: String,
    api: Arc<TelegramApi>,
    state: Mutex<TelegramState>,
}

struct TelegramState {
    status: ChannelStatus,
    cancel: Option<CancellationToken>,
    poll_handle: Option<JoinHandle<()>>,
}

impl TelegramChannel {
    /// Create a new Telegram channel with the given ID and bot token.
    pub fn new(id: impl Into<String>, bot_token: &str) -> anyhow::Result<Self> {
        let api = TelegramApi::new(bot_token).context("Failed to build Telegram client")?;
        Ok(Self {
            id: id.into(),
            api: Arc::new(api),
            state: Mutex::new(TelegramState {
                status: ChannelStatus::Stopped,
                cancel: None,
                poll_handle: None,
            }),
        })
    }

    async fn register_commands(&self) {
        let params = SetMyCommandsParams {
            commands: BOT_COMMANDS
                .iter()
                .map(|(command, description)| BotCommand {
                    command: command.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        };
        // The bot still works from plain text without a menu.
        if let Err(e) = self.api.set_my_commands(&params).await {
            warn!(channel_id = self.id, "Failed to register bot commands: {e}");
        }
    }
}

impl From<ApiError> for DeliveryError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Api { .. } => DeliveryError::Rejected(err.to_string()),
            ApiError::Transport { .. } | ApiError::EmptyResult(_) => {
                DeliveryError::Transport(err.to_string())
            }
        }
    }
}

#[async_trait::async_trait]
impl ChannelPlugin for TelegramChannel {
    fn channel_type(&self) -> &str {
        "telegram"
    }

    fn channel_id(&self) -> &str {
        &self.id
    }

    async fn start(&self, sender: mpsc::Sender<InboundMessage>) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if state.status == ChannelStatus::Running {
            bail!("Telegram channel {} is already running", self.id);
        }

        state.status = ChannelStatus::Starting;

        // Verify bot token
        match self.api.get_me().await {
            Ok(bot) => {
                info!(
                    channel_id = self.id,
                    bot_username = bot.username.as_deref().unwrap_or("unknown"),
                    "Telegram bot authenticated"
                );
            }
            Err(e) => {
                state.status = ChannelStatus::Error(format!("Auth failed: {e}"));
                bail!("Failed to authenticate Telegram bot: {e}");
            }
        }

        self.register_commands().await;

        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let channel_id = self.id.clone();
        let api = self.api.clone();

        let handle = tokio::spawn(async move {
            polling::run_polling_loop(&api, channel_id, sender, cancel_child).await;
        });

        state.cancel = Some(cancel);
        state.poll_handle = Some(handle);
        state.status = ChannelStatus::Running;

        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;

        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }

        if let Some(handle) = state.poll_handle.take() {
            let _ = handle.await;
        }

        state.status = ChannelStatus::Stopped;
        Ok(())
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let params = SendMessageParams {
            chat_id: message.chat_id,
            text: message.text,
            reply_markup: message.keyboard.as_ref().map(ReplyKeyboardMarkup::from),
        };
        self.api.send_message(&params).await?;
        Ok(())
    }

    fn status(&self) -> ChannelStatus {
        match self.state.try_lock() {
            Ok(state) => state.status.clone(),
            Err(_) => ChannelStatus::Starting,
        }
    }
}
