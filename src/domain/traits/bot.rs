use async_trait::async_trait;
use crate::domain::entities::{ChannelId, UserId};
use crate::application::errors::TransportError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Connect to the platform
    async fn start(&self) -> Result<(), TransportError>;

    /// Send a message to a channel, returning the new message id
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<String, TransportError>;

    /// React to a message.
    ///
    /// Fails with `TransportError::Forbidden` once the platform's
    /// per-message reaction limit has been reached.
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message_id: &str,
        reaction: &str,
    ) -> Result<(), TransportError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: UserId,
    pub name: String,
    pub username: String,
}
