use crate::application::commands::emotes;
use crate::application::context::AppContext;
use crate::application::errors::{BotError, DispatchError};
use crate::application::messaging::format::message_chunks;
use crate::application::messaging::{CommandDispatcher, Inbound, MessageParser};
use crate::domain::entities::{Message, ScopeId};

/// Routes inbound messages: commands to the dispatcher, emote messages to
/// the emote store, then every message through the keyword matcher.
///
/// Nothing a single message does can stop the loop; failures are logged.
pub struct MessageService {
    ctx: AppContext,
    dispatcher: CommandDispatcher,
    parser: MessageParser,
}

impl MessageService {
    pub fn new(ctx: AppContext, dispatcher: CommandDispatcher) -> Self {
        let parser = MessageParser::new(
            ctx.config.bot.command_prefix.clone(),
            ctx.config.bot.emote_prefix.clone(),
        );
        Self {
            ctx,
            dispatcher,
            parser,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Guild became available (startup or join)
    pub async fn add_scope(&self, scope: ScopeId) -> Result<(), BotError> {
        tracing::info!("Initializing storage for scope {}", scope);
        self.ctx.add_scope(scope).await
    }

    /// Process one inbound message to completion
    pub async fn handle(&self, message: &Message) {
        self.ctx.stats.message_seen();

        if message.author.id == self.ctx.bot.bot_info().id {
            return;
        }

        match self.parser.classify(&message.content, &message.clean_content) {
            Inbound::Command { name, .. } => {
                if name.is_empty() {
                    tracing::info!("Ignoring null command");
                    return;
                }
                tracing::info!(
                    "[{}] Handling command message \"{}\" from user {}",
                    message.location(),
                    message.content,
                    message.author
                );
                self.ctx.stats.command_seen();
                self.run_command(&name, message).await;
            }
            Inbound::Emote { name } => {
                tracing::info!(
                    "[{}] Handling emote message \"{}\" from {}",
                    message.location(),
                    message.clean_content,
                    message.author
                );
                match emotes::display(&self.ctx, message, &name).await {
                    Ok(Some(payload)) => self.reply(message, &payload).await,
                    Ok(None) => {}
                    Err(e) => tracing::error!("[{}] Error displaying emote \"{}\": {}", message.location(), name, e),
                }
                self.ctx.stats.emote_seen();
            }
            Inbound::Text => {}
        }

        if let Err(e) = self.ctx.keywords.handle(self.ctx.bot.as_ref(), message).await {
            tracing::error!("[{}] Error handling keywords: {}", message.location(), e);
        }
    }

    async fn run_command(&self, name: &str, message: &Message) {
        match self.dispatcher.dispatch(&self.ctx, name, message).await {
            Ok(reply) => {
                self.ctx.stats.command_run();
                if let Some(text) = reply {
                    self.reply(message, &text).await;
                }
            }
            Err(BotError::Dispatch(e)) => {
                tracing::info!(
                    "[{}] Exception executing command \"{}\" from {}: {}",
                    message.location(),
                    name,
                    message.author,
                    e
                );
                let visible = match e {
                    DispatchError::UnknownCommand(_) => self.ctx.config.bot.unknown_command_message,
                    DispatchError::PermissionDenied { .. } | DispatchError::WriteDenied(_) => true,
                    DispatchError::DuplicateCommand(_) => false,
                };
                if visible {
                    self.reply(message, &e.to_string()).await;
                }
            }
            Err(e) => {
                tracing::error!(
                    "[{}] Error executing command \"{}\" from {}: {:?}",
                    message.location(),
                    name,
                    message.author,
                    e
                );
            }
        }
    }

    /// Send text to the message's channel in message-sized chunks
    async fn reply(&self, message: &Message, text: &str) {
        for chunk in message_chunks(text) {
            if let Err(e) = self.ctx.bot.send_message(message.channel_id, &chunk).await {
                tracing::warn!("Failed to send reply to {}: {}", message.channel_id, e);
                return;
            }
        }
    }
}
