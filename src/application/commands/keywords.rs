//! Keyword admin commands
//!
//! Every structural change rebuilds the scope's automaton before the
//! command acknowledges it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::server_only;
use crate::application::context::AppContext;
use crate::application::errors::{BotError, DispatchError, StorageError};
use crate::application::messaging::{parser, CommandDispatcher};
use crate::domain::entities::{Command, KeywordEntry, Message, UserId};
use crate::domain::traits::{CommandHandler, HandlerResult};

/// A custom emoji as typed in chat, `<:name:id>`
static CUSTOM_EMOJI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<:([^:]+:\d+)>").unwrap());

pub enum KeywordCommand {
    Add,
    Remove,
    List,
    Count,
    Refresh,
}

pub fn register(dispatcher: &mut CommandDispatcher, owner: UserId) -> Result<(), DispatchError> {
    dispatcher.register(
        Command::new("addkeyword", KeywordCommand::Add)
            .with_description("Count a keyword, optionally reacting to it")
            .read_write(),
    )?;
    for name in ["deletekeyword", "removekeyword"] {
        dispatcher.register(
            Command::new(name, KeywordCommand::Remove)
                .with_description("Remove a keyword with its count and reactions")
                .read_write(),
        )?;
    }
    dispatcher.register(Command::new("keywords", KeywordCommand::List).with_description("List known keywords"))?;
    dispatcher.register(Command::new("count", KeywordCommand::Count).with_description("Show a keyword's count"))?;
    dispatcher.register(
        Command::new("refreshkeywords", KeywordCommand::Refresh)
            .with_description("Reload keywords for this server (owner only)")
            .owner_only(owner),
    )?;
    Ok(())
}

pub fn help(prefix: &str) -> String {
    format!(
        "```
Keywords:
  The bot counts keywords and sends messages when \"gets\" occur.
  (Technically, it counts messages in which a keyword occurs.) The bot
  can also post reactions to keywords.

  {p}addkeyword <keyword> <optional reaction>
    Add a keyword. A keyword may have zero or more reactions, added one at
    a time; they are posted on every message containing the keyword.

  {p}count <keyword>
    Show the current count of a given keyword.

  {p}deletekeyword
    Alias for `removekeyword`.

  {p}refreshkeywords
    (Owner only.) Reload the keywords for the current server.

  {p}removekeyword <keyword>
    Remove a keyword. WARNING: This removes a keyword with its count and
    all associated reactions.
```",
        p = prefix
    )
}

/// `<:name:id>` becomes `name:id`; anything else is stored as typed
pub fn normalize_reaction(reaction: &str) -> String {
    match CUSTOM_EMOJI.captures(reaction).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().to_string(),
        None => reaction.to_string(),
    }
}

async fn add(ctx: &AppContext, message: &Message, args: Option<String>) -> HandlerResult {
    let Some(scope) = message.scope else {
        return server_only();
    };
    let Some(args) = args else {
        return Ok(Some(format!("I can't add nothing, {}.", ctx.random_insult())));
    };
    let (keyword, reaction) = parser::split_first_word(&args);

    let store = ctx.keywords.stores().open(scope).await?;
    let mut store = store.lock().await;

    let reply = match reaction {
        None => {
            store.set_as(keyword, &KeywordEntry::default())?;
            tracing::info!("{} added keyword \"{}\"", message.author, keyword);
            "Keyword added!"
        }
        Some(reaction) => {
            let reaction = normalize_reaction(reaction);
            let mut entry: KeywordEntry = match store.get_as(keyword) {
                Ok(entry) => entry,
                Err(StorageError::KeyNotFound(_)) => KeywordEntry::default(),
                Err(e) => return Err(BotError::from(e)),
            };
            entry.reactions.push(reaction.clone());
            store.set_as(keyword, &entry)?;
            tracing::info!("{} added keyword \"{}\" -> \"{}\"", message.author, keyword, reaction);
            "Added keyword reaction!"
        }
    };

    ctx.keywords.rebuild_locked(&store).await?;
    store.save().await?;
    Ok(Some(reply.to_string()))
}

async fn remove(ctx: &AppContext, message: &Message, args: Option<String>) -> HandlerResult {
    let Some(scope) = message.scope else {
        return server_only();
    };
    let Some(keyword) = args else {
        return Ok(Some(format!("I can't delete nothing, {}.", ctx.random_insult())));
    };

    let store = ctx.keywords.stores().open(scope).await?;
    let mut store = store.lock().await;
    match store.delete(&keyword) {
        Ok(_) => {
            ctx.keywords.rebuild_locked(&store).await?;
            store.save().await?;
            tracing::info!("{} removed keyword \"{}\"", message.author, keyword);
            Ok(Some("Removed keyword!".to_string()))
        }
        Err(StorageError::KeyNotFound(_)) => Ok(Some("That keyword doesn't exist!".to_string())),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CommandHandler for KeywordCommand {
    async fn invoke(&self, ctx: &AppContext, message: &Message) -> HandlerResult {
        let args = ctx.command_args(message);
        match self {
            KeywordCommand::Add => add(ctx, message, args).await,
            KeywordCommand::Remove => remove(ctx, message, args).await,
            KeywordCommand::List => {
                let Some(scope) = message.scope else {
                    return server_only();
                };
                let store = ctx.keywords.stores().open(scope).await?;
                let store = store.lock().await;
                if store.is_empty() {
                    return Ok(Some("I don't have any keywords for this server yet!".to_string()));
                }
                Ok(Some(store.as_sorted_text_list()))
            }
            KeywordCommand::Count => {
                let Some(scope) = message.scope else {
                    return server_only();
                };
                let store = ctx.keywords.stores().open(scope).await?;
                let store = store.lock().await;
                let entry = args.as_deref().and_then(|keyword| store.get_as::<KeywordEntry>(keyword).ok());
                Ok(Some(match entry {
                    Some(entry) => entry.count.to_string(),
                    None => "I don't know that keyword.".to_string(),
                }))
            }
            KeywordCommand::Refresh => {
                let Some(scope) = message.scope else {
                    return server_only();
                };
                let loaded = ctx.keywords.reload(scope).await?;
                tracing::info!("[{}] Reloaded {} keyword(s)", scope, loaded);
                Ok(Some("Keywords refreshed!".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{guild_message, test_context, TEST_SCOPE};
    use crate::domain::traits::StoreKind;
    use crate::infrastructure::storage::FileBackend;

    async fn entry(ctx: &AppContext, keyword: &str) -> Option<KeywordEntry> {
        let store = ctx.keywords.stores().open(TEST_SCOPE).await.unwrap();
        let store = store.lock().await;
        store.get_as(keyword).ok()
    }

    #[test]
    fn test_normalize_reaction() {
        assert_eq!(normalize_reaction("<:party:123456>"), "party:123456");
        assert_eq!(normalize_reaction("👍"), "👍");
        assert_eq!(normalize_reaction("<:broken>"), "<:broken>");
    }

    #[tokio::test]
    async fn test_add_keyword_and_reactions() {
        let (ctx, _bot, _dir) = test_context().await;

        let reply = KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword Hello")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Keyword added!"));

        let reply = KeywordCommand::Add
            .invoke(&ctx, &guild_message(2, "!addkeyword hello <:wave:42>"))
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Added keyword reaction!"));
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword hello 👍")).await.unwrap();

        let stored = entry(&ctx, "hello").await.unwrap();
        assert_eq!(stored.reactions, vec!["wave:42".to_string(), "👍".to_string()]);
        assert_eq!(stored.count, 0);
    }

    #[tokio::test]
    async fn test_added_keyword_is_matched_immediately() {
        let (ctx, bot, _dir) = test_context().await;
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword dragon 🐉")).await.unwrap();

        let report = ctx.keywords.handle(bot.as_ref(), &guild_message(3, "Here be DRAGONs")).await.unwrap();

        assert_eq!(report.counted, vec![("dragon".to_string(), 1)]);
        assert_eq!(bot.reactions(), vec!["🐉".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_keyword() {
        let (ctx, bot, _dir) = test_context().await;
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword foo")).await.unwrap();
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword bar")).await.unwrap();

        let reply = KeywordCommand::Remove.invoke(&ctx, &guild_message(2, "!removekeyword FOO")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Removed keyword!"));
        let reply = KeywordCommand::Remove.invoke(&ctx, &guild_message(2, "!removekeyword foo")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("That keyword doesn't exist!"));

        let report = ctx.keywords.handle(bot.as_ref(), &guild_message(3, "foo bar")).await.unwrap();
        assert_eq!(report.counted, vec![("bar".to_string(), 1)]);
        assert!(entry(&ctx, "foo").await.is_none());
    }

    #[tokio::test]
    async fn test_count_and_list() {
        let (ctx, bot, _dir) = test_context().await;
        let reply = KeywordCommand::List.invoke(&ctx, &guild_message(2, "!keywords")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("I don't have any keywords for this server yet!"));

        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword zeta")).await.unwrap();
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword alpha")).await.unwrap();
        ctx.keywords.handle(bot.as_ref(), &guild_message(3, "alpha")).await.unwrap();
        ctx.keywords.handle(bot.as_ref(), &guild_message(3, "alpha alpha")).await.unwrap();

        let reply = KeywordCommand::List.invoke(&ctx, &guild_message(2, "!keywords")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("alpha, zeta"));
        let reply = KeywordCommand::Count.invoke(&ctx, &guild_message(2, "!count Alpha")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("2"));
        let reply = KeywordCommand::Count.invoke(&ctx, &guild_message(2, "!count omega")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("I don't know that keyword."));
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let (ctx, _bot, _dir) = test_context().await;

        let reply = KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("I can't add nothing, you dummy."));
        let reply = KeywordCommand::Remove.invoke(&ctx, &guild_message(2, "!removekeyword")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("I can't delete nothing, you dummy."));
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_from_disk() {
        let (ctx, bot, _dir) = test_context().await;
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword saved")).await.unwrap();
        {
            let store = ctx.keywords.stores().open(TEST_SCOPE).await.unwrap();
            let mut store = store.lock().await;
            store.set_as("unsaved", &KeywordEntry::default()).unwrap();
            ctx.keywords.rebuild_locked(&store).await.unwrap();
        }

        let reply = KeywordCommand::Refresh.invoke(&ctx, &guild_message(1, "!refreshkeywords")).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Keywords refreshed!"));

        let report = ctx.keywords.handle(bot.as_ref(), &guild_message(3, "saved unsaved")).await.unwrap();
        assert_eq!(report.counted, vec![("saved".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_failed_save_still_rebuilds_automaton() {
        let (ctx, bot, dir) = test_context().await;
        KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword bar 👍")).await.unwrap();
        let path = FileBackend::new(dir.path()).path_for(StoreKind::Keywords, TEST_SCOPE);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let added = KeywordCommand::Add.invoke(&ctx, &guild_message(2, "!addkeyword foo")).await;
        assert!(matches!(added, Err(BotError::Storage(_))));
        let removed = KeywordCommand::Remove.invoke(&ctx, &guild_message(2, "!removekeyword bar")).await;
        assert!(matches!(removed, Err(BotError::Storage(_))));

        let report = ctx.keywords.handle(bot.as_ref(), &guild_message(3, "foo foo bar")).await.unwrap();
        assert_eq!(report.counted, vec![("foo".to_string(), 1)]);
        assert!(bot.reactions().is_empty());
    }
}
