//! Shared fixtures for the integration tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};

use dragon_bot::application::commands::register_all;
use dragon_bot::application::context::AppContext;
use dragon_bot::application::errors::TransportError;
use dragon_bot::application::messaging::CommandDispatcher;
use dragon_bot::application::services::MessageService;
use dragon_bot::domain::entities::{ChannelId, Message, ScopeId, User, UserId, MAX_REACTIONS};
use dragon_bot::domain::traits::{Bot, BotInfo};
use dragon_bot::infrastructure::config::Config;
use dragon_bot::infrastructure::storage::FileBackend;

pub const GUILD: ScopeId = ScopeId(42);
pub const CHANNEL: ChannelId = ChannelId(7);
pub const OWNER: UserId = UserId(1);

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Records outbound traffic; refuses reactions past the platform limit
#[derive(Default)]
pub struct RecordingBot {
    sent: Mutex<Vec<String>>,
    reactions: Mutex<Vec<(String, String)>>,
}

impl RecordingBot {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reactions_on(&self, message_id: &str) -> Vec<String> {
        self.reactions
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == message_id)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn start(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_message(&self, _channel: ChannelId, text: &str) -> Result<String, TransportError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn add_reaction(&self, _channel: ChannelId, message_id: &str, reaction: &str) -> Result<(), TransportError> {
        let mut reactions = self.reactions.lock().unwrap();
        if reactions.iter().filter(|(id, _)| id == message_id).count() >= MAX_REACTIONS {
            return Err(TransportError::Forbidden("Maximum number of reactions reached".to_string()));
        }
        reactions.push((message_id.to_string(), reaction.to_string()));
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: UserId(999),
            name: "DragonBot".to_string(),
            username: "dragonbot".to_string(),
        }
    }
}

pub struct Harness {
    pub service: MessageService,
    pub bot: Arc<RecordingBot>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        ensure_init();
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.bot.owner_id = Some(OWNER);
        config.storage.directory = Some(dir.path().to_path_buf());
        adjust(&mut config);

        let bot = Arc::new(RecordingBot::default());
        let mut dispatcher = CommandDispatcher::new(config.bot.read_only);
        register_all(&mut dispatcher, OWNER, &config.bot.command_prefix).unwrap();
        let backend = Arc::new(FileBackend::new(dir.path()));
        let ctx = AppContext::new(config, bot.clone(), backend).unwrap();

        let service = MessageService::new(ctx, dispatcher);
        service.add_scope(GUILD).await.unwrap();
        Self { service, bot, dir }
    }

    pub fn message(&self, author: u64, text: &str) -> Message {
        let author = User::new(author).with_username(format!("user{}", author));
        Message::new(CHANNEL, author, text).in_scope(GUILD)
    }

    /// Send a message and return its id
    pub async fn say(&self, author: u64, text: &str) -> String {
        let message = self.message(author, text);
        self.service.handle(&message).await;
        message.id
    }
}
