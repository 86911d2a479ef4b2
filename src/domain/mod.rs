//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (User, Message, Command, KeywordEntry)
//! - Traits: Abstractions for infrastructure (Bot, Persistence, CommandHandler)

pub mod entities;
pub mod traits;
