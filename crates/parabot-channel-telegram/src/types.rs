//! Telegram Bot API types (minimal subset).

use serde::{Deserialize, Serialize};

use parabot_types::Keyboard;

/// Generic Telegram API response wrapper.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Bot identity returned by `getMe`.
#[derive(Debug, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// A Telegram Update object.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
}

/// A Telegram message.
#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub date: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
}

/// A message entity (bold, command, mention, etc.).
#[derive(Debug, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub offset: i64,
    pub length: i64,
}

/// A Telegram user.
#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Build a display name from first + last name.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// A Telegram chat.
#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

/// Parameters for `getUpdates`.
#[derive(Debug, Serialize)]
pub struct GetUpdatesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
}

/// One button of a reply keyboard.
#[derive(Debug, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

/// Custom keyboard shown instead of the system one.
#[derive(Debug, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub is_persistent: bool,
}

impl From<&Keyboard> for ReplyKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: label.clone(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
            is_persistent: true,
        }
    }
}

/// Parameters for `sendMessage`.
#[derive(Debug, Serialize)]
pub struct SendMessageParams {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

/// A bot command for `setMyCommands`.
#[derive(Debug, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

/// Parameters for `setMyCommands`.
#[derive(Debug, Serialize)]
pub struct SetMyCommandsParams {
    pub commands: Vec<BotCommand>,
}
