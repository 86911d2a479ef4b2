//! Emote commands and display

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;

use super::server_only;
use crate::application::context::AppContext;
use crate::application::errors::{BotError, DispatchError, StorageError};
use crate::application::messaging::CommandDispatcher;
use crate::domain::entities::{Command, Message, UserId};
use crate::domain::traits::{CommandHandler, HandlerResult};

/// `{name}{payload}`; either part may contain spaces but not braces
static ADD_EMOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\{\s*([^{}]+)\s*\}\s*\{\s*([^{}]+)\s*\}").unwrap());

pub enum EmoteCommand {
    List,
    Add,
    Remove,
    Refresh,
}

pub fn register(dispatcher: &mut CommandDispatcher, owner: UserId) -> Result<(), DispatchError> {
    dispatcher.register(Command::new("emotes", EmoteCommand::List).with_description("List known emotes"))?;
    dispatcher.register(
        Command::new("addemote", EmoteCommand::Add)
            .with_description("Add an emote: `{name}{payload}` (owner only)")
            .read_write()
            .owner_only(owner),
    )?;
    for name in ["deleteemote", "removeemote"] {
        dispatcher.register(
            Command::new(name, EmoteCommand::Remove)
                .with_description("Remove an emote (owner only)")
                .read_write()
                .owner_only(owner),
        )?;
    }
    dispatcher.register(
        Command::new("refreshemotes", EmoteCommand::Refresh)
            .with_description("Reload emotes for this server (owner only)")
            .owner_only(owner),
    )?;
    Ok(())
}

pub fn help(prefix: &str, emote_prefix: &str) -> String {
    format!(
        "```
Emotes:
  Emotes are activated by sending a message beginning with \"{e}\" followed
  by the name of the emote.

  {p}addemote {{<emote name>}}{{<emote payload>}}
    Add an emote. `{p}addemote {{example}}{{http://example.com/emote.png}}`
    lets you post the URL with `{e}example`. Both parts must be wrapped in
    curly braces because either may contain whitespace. (Owner only.)

  {p}deleteemote <emote name>
    Alias for `{p}removeemote`.

  {p}emotes
    Show a list of known emotes.

  {p}refreshemotes
    (Owner only.) Reload the emotes for the current server.

  {p}removeemote <emote name>
    Remove an emote. (Owner only.)
```",
        p = prefix,
        e = emote_prefix
    )
}

/// Split `{name}{payload}` into its trimmed parts
pub fn parse_add_emote(args: &str) -> Option<(String, String)> {
    let captures = ADD_EMOTE.captures(args)?;
    let name = captures.get(1)?.as_str().trim();
    let payload = captures.get(2)?.as_str().trim();
    Some((name.to_string(), payload.to_string()))
}

/// Post the payload for an emote message; unknown emotes are ignored
pub async fn display(ctx: &AppContext, message: &Message, name: &str) -> HandlerResult {
    let Some(scope) = message.scope else {
        return server_only();
    };
    match ctx.emotes.lookup(scope, name).await? {
        Some(payload) => {
            tracing::debug!("Posting emote \"{}\"", payload);
            Ok(Some(payload))
        }
        None => {
            tracing::debug!("Unknown emote \"{}\"", name);
            Ok(None)
        }
    }
}

#[async_trait]
impl CommandHandler for EmoteCommand {
    async fn invoke(&self, ctx: &AppContext, message: &Message) -> HandlerResult {
        let Some(scope) = message.scope else {
            return server_only();
        };
        let store = ctx.emotes.stores().open(scope).await?;

        match self {
            EmoteCommand::List => {
                let store = store.lock().await;
                if store.is_empty() {
                    return Ok(Some("I don't have any emotes for this server yet!".to_string()));
                }
                Ok(Some(store.as_sorted_text_list()))
            }
            EmoteCommand::Add => {
                let parsed = ctx.command_args(message).as_deref().and_then(parse_add_emote);
                let Some((name, payload)) = parsed else {
                    tracing::info!("Failed to parse addemote arguments from {}", message.author);
                    return Ok(Some(format!("Give me a name and a value, {}.", ctx.random_insult())));
                };

                let mut store = store.lock().await;
                match store.add(&name, Value::String(payload)) {
                    Ok(()) => {
                        store.save().await?;
                        tracing::info!("[{}] {} added emote \"{}\"", scope, message.author, name);
                        Ok(Some("Added emote!".to_string()))
                    }
                    Err(StorageError::KeyExists(_)) => {
                        Ok(Some(format!("That emote already exists, {}.", ctx.random_insult())))
                    }
                    Err(e) => Err(BotError::from(e)),
                }
            }
            EmoteCommand::Remove => {
                let Some(name) = ctx.command_args(message) else {
                    return Ok(Some(format!("I can't delete nothing, {}.", ctx.random_insult())));
                };

                let mut store = store.lock().await;
                match store.delete(&name) {
                    Ok(_) => {
                        store.save().await?;
                        tracing::info!("[{}] {} deleted emote \"{}\"", scope, message.author, name);
                        Ok(Some("Deleted emote!".to_string()))
                    }
                    Err(StorageError::KeyNotFound(_)) => {
                        Ok(Some(format!("That emote isn't stored, {}.", ctx.random_insult())))
                    }
                    Err(e) => Err(BotError::from(e)),
                }
            }
            EmoteCommand::Refresh => {
                store.lock().await.load().await?;
                Ok(Some("Emotes refreshed!".to_string()))
            }
        }
    }
}
