//! Channel plugin abstraction for the chat transport.
//!
//! ```text
//! Chat platform
//!     ↓ (platform-specific protocol)
//! ChannelPlugin::start() spawns listener
//!     ↓ (InboundMessage via mpsc)
//! Dispatcher → schedule views
//!     ↓ (reply text + keyboard)
//! ChannelPlugin::send(OutboundMessage)
//!     ↓
//! Chat platform
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use parabot_types::{ChannelStatus, InboundMessage, OutboundMessage};

/// Upper bound on a single outbound send.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a message could not be delivered.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The platform answered but refused the message.
    #[error("rejected by platform: {0}")]
    Rejected(String),
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for channel plugins that bridge a chat platform to the bot.
///
/// Use `&self` for all methods; implementations keep mutable state behind
/// interior mutability (e.g. `Mutex`).
#[async_trait::async_trait]
pub trait ChannelPlugin: Send + Sync {
    /// Returns the channel type identifier (e.g. "telegram").
    fn channel_type(&self) -> &str;

    /// Returns the unique instance identifier for this channel.
    fn channel_id(&self) -> &str;

    /// Connect to the platform and push incoming messages into `sender`.
    async fn start(&self, sender: mpsc::Sender<InboundMessage>) -> anyhow::Result<()>;

    /// Disconnect from the platform.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Send a message to the platform.
    async fn send(&self, message: OutboundMessage) -> Result<(), DeliveryError>;

    /// Returns the current status of this channel.
    fn status(&self) -> ChannelStatus;
}

/// Send with [`SEND_TIMEOUT`].
pub async fn deliver(
    channel: &dyn ChannelPlugin,
    message: OutboundMessage,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(SEND_TIMEOUT, channel.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout(SEND_TIMEOUT)),
    }
}

/// Fire-and-forget delivery on its own task. Failures are logged and dropped.
pub fn spawn_delivery(
    channel: Arc<dyn ChannelPlugin>,
    message: OutboundMessage,
    what: &'static str,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let chat_id = message.chat_id;
        match deliver(channel.as_ref(), message).await {
            Ok(()) => debug!(chat_id, what, "Message delivered"),
            Err(e) => warn!(
                channel_id = channel.channel_id(),
                chat_id,
                what,
                "Delivery failed: {e}"
            ),
        }
    })
}
