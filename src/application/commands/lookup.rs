//! Lookup commands: Urban Dictionary, Wikipedia and short answers
//!
//! Failures of the remote services are logged and answered with an
//! apology; they never propagate to the shell.

use async_trait::async_trait;

use crate::application::context::AppContext;
use crate::application::errors::{DispatchError, LookupError};
use crate::application::messaging::format::truncate;
use crate::application::messaging::CommandDispatcher;
use crate::domain::entities::{Command, Message};
use crate::domain::traits::{CommandHandler, HandlerResult};
use crate::infrastructure::lookup::{UrbanResult, WikiPage, WikiResult, WolframAnswer};

/// Room left for title and link within one message
pub const MAX_EXTRACT_CHARS: usize = 1500;

pub enum LookupCommand {
    UrbanDictionary,
    Wikipedia,
    Ask,
}

pub fn register(dispatcher: &mut CommandDispatcher) -> Result<(), DispatchError> {
    for name in ["ud", "urban", "urbandictionary"] {
        dispatcher.register(
            Command::new(name, LookupCommand::UrbanDictionary).with_description("Look up a term on Urban Dictionary"),
        )?;
    }
    for name in ["wiki", "wikipedia"] {
        dispatcher.register(
            Command::new(name, LookupCommand::Wikipedia).with_description("Look up an article on Wikipedia"),
        )?;
    }
    dispatcher.register(Command::new("ask", LookupCommand::Ask).with_description("Ask a question, get a simple answer"))?;
    Ok(())
}

pub fn help(prefix: &str) -> String {
    format!(
        "```
Lookups:
  {p}ud, {p}urban or {p}urbandictionary <search term>
    Look up a search term on Urban Dictionary.

  {p}wiki or {p}wikipedia <article title>
    Look up an article extract on Wikipedia.

  {p}ask <question>
    Ask a question, get a simple answer.
```",
        p = prefix
    )
}

/// Apology for a failed lookup
fn failure_reply(service: &str, error: &LookupError) -> String {
    match error {
        LookupError::NotConfigured(what) => {
            tracing::warn!("{} lookup requested but {} is not configured", service, what);
            format!("{} lookups aren't set up here.", service)
        }
        LookupError::Status { .. } => {
            tracing::warn!("{} lookup failed: {}", service, error);
            "An error occurred.".to_string()
        }
        _ => {
            tracing::error!("{} lookup failed: {}", service, error);
            "Unknown error.".to_string()
        }
    }
}

pub fn format_urban(result: UrbanResult) -> String {
    match result {
        UrbanResult::Found(definition) => format!(
            "**{}**\n<{}>\n{}",
            definition.word,
            definition.permalink,
            truncate(&definition.definition, MAX_EXTRACT_CHARS)
        ),
        UrbanResult::NoResults => "No results.".to_string(),
        UrbanResult::NotFound => "No pages with that title found.".to_string(),
    }
}

fn format_page(page: &WikiPage) -> String {
    format!("**{}**\n<{}>\n{}", page.title, page.url, truncate(&page.extract, MAX_EXTRACT_CHARS))
}

pub fn format_wiki(result: WikiResult) -> String {
    match result {
        WikiResult::Pages(pages) => pages.iter().map(format_page).collect::<Vec<_>>().join("\n\n"),
        WikiResult::NotFound => "No pages with that title found.".to_string(),
    }
}

pub fn format_answer(answer: WolframAnswer) -> String {
    match answer {
        WolframAnswer::Answer(text) => text,
        WolframAnswer::NotUnderstood(Some(text)) => text,
        WolframAnswer::NotUnderstood(None) => "I don't know how to answer that.".to_string(),
        WolframAnswer::InvalidInput => "Invalid input.".to_string(),
    }
}

#[async_trait]
impl CommandHandler for LookupCommand {
    async fn invoke(&self, ctx: &AppContext, message: &Message) -> HandlerResult {
        let args = ctx.command_args(message);
        let reply = match self {
            LookupCommand::UrbanDictionary => match args {
                None => "What should I look up?".to_string(),
                Some(term) => match ctx.lookups.urban_dictionary(&term).await {
                    Ok(result) => format_urban(result),
                    Err(e) => failure_reply("Urban Dictionary", &e),
                },
            },
            LookupCommand::Wikipedia => match args {
                None => "What should I look up?".to_string(),
                Some(title) => match ctx.lookups.wikipedia(&title).await {
                    Ok(result) => format_wiki(result),
                    Err(e) => failure_reply("Wikipedia", &e),
                },
            },
            LookupCommand::Ask => match args {
                None => "What is your question?".to_string(),
                Some(question) => match ctx.lookups.wolfram_short_answer(&question).await {
                    Ok(answer) => format_answer(answer),
                    Err(e) => failure_reply("Question", &e),
                },
            },
        };
        Ok(Some(reply))
    }
}
