//! Application services - Business logic orchestration

pub mod emote_service;
pub mod keyword_service;
pub mod message_service;

pub use emote_service::EmoteService;
pub use keyword_service::{KeywordAutomaton, KeywordMatcher, MatchReport};
pub use message_service::MessageService;
