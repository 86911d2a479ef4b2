//! Shared fixtures for unit tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::application::context::AppContext;
use crate::application::errors::TransportError;
use crate::domain::entities::{ChannelId, Message, ScopeId, User, UserId, MAX_REACTIONS};
use crate::domain::traits::{Bot, BotInfo};
use crate::infrastructure::config::Config;
use crate::infrastructure::storage::FileBackend;

pub const TEST_SCOPE: ScopeId = ScopeId(500);
pub const TEST_CHANNEL: ChannelId = ChannelId(10);
pub const TEST_OWNER: UserId = UserId(1);
pub const BOT_ID: UserId = UserId(999);

/// A transport that records everything and enforces the reaction limit
#[derive(Default)]
pub struct RecordingBot {
    sent: Mutex<Vec<(ChannelId, String)>>,
    reactions: Mutex<Vec<(String, String)>>,
    failing: HashSet<String>,
}

impl RecordingBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every attempt to add `reaction` fail with an HTTP error
    pub fn failing_reaction(mut self, reaction: &str) -> Self {
        self.failing.insert(reaction.to_string());
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn sent_to(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<String> {
        self.reactions.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn start(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<String, TransportError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel, text.to_string()));
        Ok(format!("sent-{}", sent.len()))
    }

    async fn add_reaction(&self, _channel: ChannelId, message_id: &str, reaction: &str) -> Result<(), TransportError> {
        if self.failing.contains(reaction) {
            return Err(TransportError::Http("Unknown Emoji".to_string()));
        }
        let mut reactions = self.reactions.lock().unwrap();
        if reactions.iter().filter(|(id, _)| id == message_id).count() >= MAX_REACTIONS {
            return Err(TransportError::Forbidden("Maximum number of reactions reached".to_string()));
        }
        reactions.push((message_id.to_string(), reaction.to_string()));
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: BOT_ID,
            name: "DragonBot".to_string(),
            username: "dragonbot".to_string(),
        }
    }
}

pub fn test_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.bot.owner_id = Some(TEST_OWNER);
    config.storage.directory = Some(dir.path().to_path_buf());
    config
}

/// A context over a temp directory with `TEST_SCOPE` initialized
pub async fn test_context() -> (AppContext, Arc<RecordingBot>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let bot = Arc::new(RecordingBot::new());
    let ctx = AppContext::new(test_config(&dir), bot.clone(), Arc::new(FileBackend::new(dir.path()))).unwrap();
    ctx.add_scope(TEST_SCOPE).await.unwrap();
    (ctx, bot, dir)
}

pub fn guild_message(author: u64, text: &str) -> Message {
    let author = User::new(author).with_username(format!("user{}", author));
    Message::new(TEST_CHANNEL, author, text).in_scope(TEST_SCOPE)
}
