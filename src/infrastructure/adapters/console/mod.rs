//! Console adapter for development/testing
//!
//! Every line typed on stdin becomes a message from `user` in one guild
//! channel. `/as <user id>` switches the author, `/quit` ends the session.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::{BotError, TransportError};
use crate::application::services::MessageService;
use crate::domain::entities::{ChannelId, Message, ScopeId, User, UserId, MAX_REACTIONS};
use crate::domain::traits::{Bot, BotInfo};

/// Id the console transport reports for the bot itself
pub const CONSOLE_BOT_ID: UserId = UserId(0);

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    guild: ScopeId,
    channel: ChannelId,
    reactions: Mutex<HashMap<String, usize>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>, guild: ScopeId, channel: ChannelId) -> Self {
        Self {
            info: BotInfo {
                id: CONSOLE_BOT_ID,
                name: name.into(),
                username: "console".to_string(),
            },
            guild,
            channel,
            reactions: Mutex::new(HashMap::new()),
        }
    }

    pub fn guild(&self) -> ScopeId {
        self.guild
    }

    /// Wrap a typed line as an inbound guild message
    pub fn inbound(&self, author: &User, line: &str) -> Message {
        Message::new(self.channel, author.clone(), line).in_scope(self.guild)
    }

    /// Feed stdin through the shell until EOF or `/quit`
    pub async fn run(&self, service: &MessageService, user: UserId) -> Result<(), BotError> {
        let mut author = console_user(user);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("[{}] Type messages; /as <user id> changes author, /quit exits.", self.info.name);

        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| TransportError::Io(e.to_string()))?;
            let Some(line) = line else {
                break;
            };
            let line = line.trim_end();

            if line == "/quit" {
                break;
            }
            if let Some(id) = line.strip_prefix("/as ") {
                match id.trim().parse::<u64>() {
                    Ok(id) => {
                        author = console_user(UserId(id));
                        println!("[{}] Now speaking as {}", self.info.name, author);
                    }
                    Err(_) => println!("[{}] Not a user id: {}", self.info.name, id.trim()),
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }

            let message = self.inbound(&author, line);
            service.handle(&message).await;
        }

        tracing::info!("Console session ended");
        Ok(())
    }
}

fn console_user(id: UserId) -> User {
    User::new(id).with_username(format!("console{}", id))
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), TransportError> {
        tracing::info!("Starting console bot (dev mode) in guild {}", self.guild);
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<String, TransportError> {
        if channel != self.channel {
            return Err(TransportError::UnknownChannel(channel.to_string()));
        }
        println!("[BOT] {}", text);
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn add_reaction(&self, _channel: ChannelId, message_id: &str, reaction: &str) -> Result<(), TransportError> {
        let mut reactions = self
            .reactions
            .lock()
            .map_err(|_| TransportError::Io("reaction table poisoned".to_string()))?;
        let count = reactions.entry(message_id.to_string()).or_insert(0);
        if *count >= MAX_REACTIONS {
            return Err(TransportError::Forbidden("Maximum number of reactions reached".to_string()));
        }
        *count += 1;
        println!("[BOT reacts to {}] {}", message_id, reaction);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
