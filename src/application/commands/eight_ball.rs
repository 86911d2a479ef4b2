//! Magic 8-ball

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::application::context::AppContext;
use crate::application::errors::DispatchError;
use crate::application::messaging::CommandDispatcher;
use crate::domain::entities::{Command, Message};
use crate::domain::traits::{CommandHandler, HandlerResult};

pub const ANSWERS: [&str; 20] = [
    "It is certain.",
    "It is decidedly so.",
    "Without a doubt.",
    "Yes - definitely.",
    "You may rely on it.",
    "As I see it, yes.",
    "Most likely.",
    "Outlook good.",
    "Yes.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Concentrate and ask again.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

pub struct EightBallCommand;

pub fn register(dispatcher: &mut CommandDispatcher) -> Result<(), DispatchError> {
    dispatcher.register(Command::new("8ball", EightBallCommand).with_description("Query the Magic 8-Ball"))?;
    Ok(())
}

pub fn help(prefix: &str) -> String {
    format!(
        "```
Magic 8-Ball:
  {p}8ball
    Query the Magic 8-Ball.
```",
        p = prefix
    )
}

fn shake() -> &'static str {
    ANSWERS.choose(&mut rand::thread_rng()).copied().unwrap_or(ANSWERS[0])
}

#[async_trait]
impl CommandHandler for EightBallCommand {
    async fn invoke(&self, _ctx: &AppContext, _message: &Message) -> HandlerResult {
        Ok(Some(shake().to_string()))
    }
}
