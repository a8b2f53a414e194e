//! Telegram Bot API HTTP client.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::{
    ApiResponse, BotInfo, GetUpdatesParams, SendMessageParams, SetMyCommandsParams, TgMessage,
    Update,
};

/// Request timeout; must stay above the long-poll timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a well-formed answer. The URL (which carries
    /// the bot token) is stripped from `source`.
    #[error("{method} request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// Telegram answered with `ok: false`.
    #[error("{method} failed: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
    #[error("{0} returned no result")]
    EmptyResult(&'static str),
}

/// HTTP client for the Telegram Bot API.
pub struct TelegramApi {
    client: Client,
    base_url: String,
}

impl TelegramApi {
    /// Create a new API client with the given bot token.
    pub fn new(bot_token: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Transport {
                method: "client",
                source,
            })?;
        Ok(Self {
            client,
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
        })
    }

    #[cfg(test)]
    pub(crate) fn set_base_url(&mut self, url: &str) {
        self.base_url = url.to_string();
    }

    async fn call<P, R>(&self, method: &'static str, params: &P) -> Result<Option<R>, ApiError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let transport = |source: reqwest::Error| ApiError::Transport {
            method,
            source: source.without_url(),
        };
        let resp: ApiResponse<R> = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(params)
            .send()
            .await
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        if !resp.ok {
            return Err(ApiError::Api {
                method,
                description: resp.description.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(resp.result)
    }

    /// Verify the bot token by calling `getMe`.
    pub async fn get_me(&self) -> Result<BotInfo, ApiError> {
        self.call("getMe", &serde_json::json!({}))
            .await?
            .ok_or(ApiError::EmptyResult("getMe"))
    }

    /// Long-poll for updates.
    pub async fn get_updates(&self, params: &GetUpdatesParams) -> Result<Vec<Update>, ApiError> {
        Ok(self.call("getUpdates", params).await?.unwrap_or_default())
    }

    /// Register bot commands in the menu.
    pub async fn set_my_commands(&self, params: &SetMyCommandsParams) -> Result<(), ApiError> {
        self.call::<_, bool>("setMyCommands", params).await?;
        Ok(())
    }

    /// Send a text message.
    pub async fn send_message(&self, params: &SendMessageParams) -> Result<TgMessage, ApiError> {
        self.call("sendMessage", params)
            .await?
            .ok_or(ApiError::EmptyResult("sendMessage"))
    }
}
