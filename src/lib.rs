//! dragon-bot - a chat bot with command dispatch, emotes and keyword counting

pub mod domain;
pub mod application;
pub mod infrastructure;
