//! Application layer errors

use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::{ScopeId, User};

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command policy errors, raised by the dispatcher before a handler runs
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Permission denied: {author} may not use \"{command}\" in {}", scope_label(.scope))]
    PermissionDenied {
        scope: Option<ScopeId>,
        author: User,
        command: String,
    },

    #[error("\"{0}\" changes stored data and the bot is running read-only")]
    WriteDenied(String),

    #[error("Command already registered: {0}")]
    DuplicateCommand(String),
}

fn scope_label(scope: &Option<ScopeId>) -> String {
    match scope {
        Some(scope) => format!("guild {}", scope),
        None => "direct messages".to_string(),
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Key already exists: {0}")]
    KeyExists(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid document for {location}: {reason}")]
    InvalidDocument { location: String, reason: String },

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Outbound transport errors
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Channel not found: {0}")]
    UnknownChannel(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// External lookup service errors
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("You are being rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Conflicting options: {0}")]
    Conflict(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
