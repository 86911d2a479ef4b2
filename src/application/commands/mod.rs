//! Command modules
//!
//! Each module exposes a handler enum implementing `CommandHandler`, a
//! `register` function adding its commands with their policy, and a help
//! section.

pub mod general;
pub mod dice;
pub mod eight_ball;
pub mod emotes;
pub mod keywords;
pub mod lookup;

use crate::application::context::SERVER_ONLY;
use crate::application::errors::DispatchError;
use crate::application::messaging::CommandDispatcher;
use crate::domain::entities::{Command, UserId};
use crate::domain::traits::HandlerResult;

use self::general::GeneralCommand;

/// Register every module's commands; `help` goes last so it can list them
pub fn register_all(dispatcher: &mut CommandDispatcher, owner: UserId, prefix: &str) -> Result<(), DispatchError> {
    general::register(dispatcher, owner)?;
    emotes::register(dispatcher, owner)?;
    keywords::register(dispatcher, owner)?;
    dice::register(dispatcher)?;
    eight_ball::register(dispatcher)?;
    lookup::register(dispatcher)?;

    let overview = overview(dispatcher, prefix);
    dispatcher.register(
        Command::new("help", GeneralCommand::Help { overview })
            .with_description("Show this help message, or `help <section>` for a module"),
    )?;
    tracing::info!("Registered {} commands", dispatcher.known_command_names().len());
    Ok(())
}

fn overview(dispatcher: &CommandDispatcher, prefix: &str) -> String {
    let mut lines = vec!["Commands:".to_string()];
    lines.push(format!("  {}help [section]", prefix));
    for command in dispatcher.commands() {
        match &command.description {
            Some(description) => lines.push(format!("  {}{} - {}", prefix, command.name, description)),
            None => lines.push(format!("  {}{}", prefix, command.name)),
        }
    }
    lines.push(format!("Help sections: {}", general::HELP_SECTIONS.join(", ")));
    format!("```\n{}\n```", lines.join("\n"))
}

/// Reply for guild-only commands used in direct messages
pub(crate) fn server_only() -> HandlerResult {
    Ok(Some(SERVER_ONLY.to_string()))
}
