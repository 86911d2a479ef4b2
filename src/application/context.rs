//! Application context - the state every handler receives
//!
//! Built once at startup and passed by reference; nothing in the bot lives
//! in a global.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::messaging::parser;
use crate::application::services::{EmoteService, KeywordMatcher};
use crate::domain::entities::{Message, ScopeId};
use crate::domain::traits::{Bot, Persistence};
use crate::infrastructure::config::Config;
use crate::infrastructure::lookup::{self, InsultService, LookupClient};

pub const SERVER_ONLY: &str = "This command can only be used in a server context.";

/// Process counters shown by `stats`
#[derive(Debug)]
pub struct Stats {
    started: DateTime<Utc>,
    messages_seen: AtomicU64,
    commands_seen: AtomicU64,
    commands_run: AtomicU64,
    emotes_seen: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
            messages_seen: AtomicU64::new(0),
            commands_seen: AtomicU64::new(0),
            commands_run: AtomicU64::new(0),
            emotes_seen: AtomicU64::new(0),
        }
    }

    pub fn message_seen(&self) {
        self.messages_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_seen(&self) {
        self.commands_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_run(&self) {
        self.commands_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn emote_seen(&self) {
        self.emotes_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started
    }

    pub fn messages_seen(&self) -> u64 {
        self.messages_seen.load(Ordering::Relaxed)
    }

    pub fn commands_seen(&self) -> u64 {
        self.commands_seen.load(Ordering::Relaxed)
    }

    pub fn commands_run(&self) -> u64 {
        self.commands_run.load(Ordering::Relaxed)
    }

    pub fn emotes_seen(&self) -> u64 {
        self.emotes_seen.load(Ordering::Relaxed)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppContext {
    pub config: Config,
    pub bot: Arc<dyn Bot>,
    pub emotes: EmoteService,
    pub keywords: KeywordMatcher,
    pub insults: InsultService,
    pub lookups: LookupClient,
    pub stats: Stats,
}

impl AppContext {
    pub fn new(config: Config, bot: Arc<dyn Bot>, backend: Arc<dyn Persistence>) -> Result<Self, BotError> {
        let client = lookup::http_client(Duration::from_secs(config.lookup.timeout_seconds))?;
        let insults = InsultService::new(client.clone(), &config.insults);
        let lookups = LookupClient::new(client, config.lookup.clone(), config.bot.name.clone());

        Ok(Self {
            emotes: EmoteService::new(backend.clone()),
            keywords: KeywordMatcher::new(backend),
            insults,
            lookups,
            stats: Stats::new(),
            config,
            bot,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.config.bot.read_only
    }

    /// Arguments following the command word
    pub fn command_args(&self, message: &Message) -> Option<String> {
        parser::command_args(&message.content, &self.config.bot.command_prefix)
    }

    pub fn random_insult(&self) -> String {
        self.insults.random_insult()
    }

    /// Start tracking emotes and keywords for a guild
    pub async fn add_scope(&self, scope: ScopeId) -> Result<(), BotError> {
        self.emotes.add_scope(scope).await?;
        self.keywords.add_scope(scope).await?;
        Ok(())
    }

    /// Persist every open store, as on shutdown
    pub async fn save_all(&self) -> Result<(), BotError> {
        self.emotes.stores().save_all().await?;
        self.keywords.stores().save_all().await?;
        Ok(())
    }
}
