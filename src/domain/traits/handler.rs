use async_trait::async_trait;
use crate::application::context::AppContext;
use crate::application::errors::BotError;
use crate::domain::entities::Message;

/// Handler result: the reply text to post, if any
pub type HandlerResult = Result<Option<String>, BotError>;

/// A command implementation, invoked by the dispatcher once policy passes
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn invoke(&self, ctx: &AppContext, message: &Message) -> HandlerResult;
}
