//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod keyword;

pub use user::{User, UserId};
pub use message::{ChannelId, Message, ScopeId, MAX_CHARACTERS, MAX_REACTIONS};
pub use command::Command;
pub use keyword::{is_get, KeywordEntry};
