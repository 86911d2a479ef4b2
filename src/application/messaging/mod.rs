//! Message handling - parsing, policy-checked dispatch, reply formatting

pub mod dispatcher;
pub mod format;
pub mod parser;
pub mod rate_limit;

pub use dispatcher::CommandDispatcher;
pub use parser::{Inbound, MessageParser};
pub use rate_limit::RateLimiter;
