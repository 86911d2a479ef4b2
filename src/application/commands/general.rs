//! General commands: help, version, stats, insult and owner tools

use async_trait::async_trait;

use super::{dice, eight_ball, emotes, keywords, lookup};
use crate::application::context::AppContext;
use crate::application::errors::{DispatchError, TransportError};
use crate::application::messaging::{parser, CommandDispatcher};
use crate::domain::entities::{ChannelId, Command, Message, UserId, MAX_CHARACTERS};
use crate::domain::traits::{CommandHandler, HandlerResult};

pub const HELP_SECTIONS: [&str; 5] = ["dice", "emotes", "keywords", "8ball", "lookup"];

const TRUTH: &str = "slushrfggts";

pub enum GeneralCommand {
    Help { overview: String },
    Version,
    Stats,
    Insult,
    Say,
    Config,
    Test,
    Truth,
}

pub fn register(dispatcher: &mut CommandDispatcher, owner: UserId) -> Result<(), DispatchError> {
    dispatcher.register(Command::new("version", GeneralCommand::Version).with_description("Show the bot version"))?;
    dispatcher.register(Command::new("stats", GeneralCommand::Stats).with_description("Show session statistics"))?;
    dispatcher.register(
        Command::new("insult", GeneralCommand::Insult).with_description("Insult someone with a random insult"),
    )?;
    dispatcher.register(
        Command::new("say", GeneralCommand::Say)
            .with_description("Post a message in a given channel (owner only)")
            .owner_only(owner),
    )?;
    dispatcher.register(
        Command::new("config", GeneralCommand::Config)
            .with_description("Show the current configuration (owner only)")
            .owner_only(owner),
    )?;
    dispatcher.register(Command::new("test", GeneralCommand::Test).owner_only(owner).read_write())?;
    dispatcher.register(Command::new("truth", GeneralCommand::Truth))?;
    Ok(())
}

pub fn version_string(read_only: bool) -> String {
    format!(
        "dragon-bot v{}{}",
        env!("CARGO_PKG_VERSION"),
        if read_only { " [READ ONLY]" } else { "" }
    )
}

/// `1d 02:03:04`, or `02:03:04` under a day
fn format_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (days, rest) = (total / 86_400, total % 86_400);
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);
    if days > 0 {
        format!("{}d {}", days, clock)
    } else {
        clock
    }
}

fn section_help(section: &str, ctx: &AppContext) -> Option<String> {
    let prefix = &ctx.config.bot.command_prefix;
    let help = match section.trim().to_lowercase().as_str() {
        "dice" => dice::help(prefix),
        "emotes" => emotes::help(prefix, &ctx.config.bot.emote_prefix),
        "keywords" => keywords::help(prefix),
        "8ball" | "8-ball" | "magic 8-ball" => eight_ball::help(prefix),
        "lookup" | "urban dictionary" | "wiki" | "wikipedia" | "wolfram" | "wolfram alpha" => lookup::help(prefix),
        _ => return None,
    };
    Some(help)
}

async fn stats(ctx: &AppContext) -> String {
    let stats = &ctx.stats;
    format!(
        "**Session Statistics**\n\
         Start time: {}\n\
         Uptime: {}\n\
         Messages seen: {}\n\
         Commands seen: {}\n\
         Commands run: {}\n\
         Emotes seen: {}\n\
         Emotes known: {}\n\
         Keywords known: {}\n\
         {}",
        stats.started().to_rfc3339(),
        format_duration(stats.uptime()),
        stats.messages_seen(),
        stats.commands_seen(),
        stats.commands_run(),
        stats.emotes_seen(),
        ctx.emotes.count_emotes().await,
        ctx.keywords.count_keywords().await,
        version_string(ctx.is_read_only()),
    )
}

async fn insult(ctx: &AppContext, message: &Message) -> String {
    let name = parser::command_args(&message.clean_content, &ctx.config.bot.command_prefix)
        .unwrap_or_else(|| message.author.display_name());
    tracing::info!("Insult: name is {}", name);

    match ctx.insults.fetch().await {
        Ok(insult) => format!("{}: {}", name, insult),
        Err(e) => {
            tracing::warn!("Error retrieving insult from server: {}", e);
            "Error retrieving insult from server.".to_string()
        }
    }
}

async fn say(ctx: &AppContext, message: &Message) -> HandlerResult {
    let Some(args) = ctx.command_args(message) else {
        return Ok(Some("Nothing to say.".to_string()));
    };
    let (channel, text) = parser::split_first_word(&args);
    let (Ok(channel), Some(text)) = (channel.parse::<u64>(), text) else {
        return Ok(Some("Need channel ID and message to send.".to_string()));
    };

    match ctx.bot.send_message(ChannelId(channel), text).await {
        Ok(_) => Ok(None),
        Err(TransportError::UnknownChannel(_)) => Ok(Some("Couldn't find channel.".to_string())),
        Err(e) => Err(e.into()),
    }
}

fn show_config(ctx: &AppContext) -> HandlerResult {
    let yaml = ctx.config.redacted().to_yaml()?;
    Ok(Some(format!("Configuration:\n```yaml\n{}```\n{}", yaml, version_string(ctx.is_read_only()))))
}

#[async_trait]
impl CommandHandler for GeneralCommand {
    async fn invoke(&self, ctx: &AppContext, message: &Message) -> HandlerResult {
        match self {
            GeneralCommand::Help { overview } => match ctx.command_args(message) {
                None => Ok(Some(overview.clone())),
                Some(section) => Ok(Some(
                    section_help(&section, ctx).unwrap_or_else(|| "I don't have help for that.".to_string()),
                )),
            },
            GeneralCommand::Version => Ok(Some(version_string(ctx.is_read_only()))),
            GeneralCommand::Stats => Ok(Some(stats(ctx).await)),
            GeneralCommand::Insult => Ok(Some(insult(ctx, message).await)),
            GeneralCommand::Say => say(ctx, message).await,
            GeneralCommand::Config => show_config(ctx),
            GeneralCommand::Test => Ok(Some("a".repeat(MAX_CHARACTERS + 500))),
            GeneralCommand::Truth => Ok(Some(TRUTH.to_string())),
        }
    }
}
