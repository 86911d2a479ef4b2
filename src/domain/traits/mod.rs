//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod handler;
pub mod store;

pub use bot::{Bot, BotInfo};
pub use handler::{CommandHandler, HandlerResult};
pub use store::{Persistence, StoreKind};
