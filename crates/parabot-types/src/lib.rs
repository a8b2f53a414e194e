use serde::{Deserialize, Serialize};

// ──────────────────── Channel Types ────────────────────

/// Message from an external channel to the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel type (e.g. "telegram").
    pub channel_type: String,
    /// Unique channel instance ID.
    pub channel_id: String,
    /// External user identifier, checked against the authorized user.
    pub sender_id: i64,
    /// Display name of the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Chat the reply should go to.
    pub chat_id: i64,
    /// Message text content.
    pub text: String,
    /// Bot command name without the leading slash or `@botname` suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Message timestamp (unix milliseconds).
    pub timestamp: i64,
}

/// Message from the dispatcher or notifier to an external channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient chat on the external platform.
    pub chat_id: i64,
    /// Message text content.
    pub text: String,
    /// Reply keyboard to show under the input field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    /// A plain text message without a keyboard.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    /// Attach a reply keyboard.
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Rows of button labels. Pressing a button sends its label as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

/// Status of a channel plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// Channel is not running.
    Stopped,
    /// Channel is initializing.
    Starting,
    /// Channel is running and accepting messages.
    Running,
    /// Channel encountered an error.
    Error(String),
}
