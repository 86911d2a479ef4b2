//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Context: the explicit state every handler receives
//! - Commands: command modules registered with the dispatcher
//! - Services: keyword matching, emotes and the message loop
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing, rate limiting, dispatching

pub mod commands;
pub mod context;
pub mod errors;
pub mod services;
pub mod messaging;

#[cfg(test)]
pub(crate) mod testing;
