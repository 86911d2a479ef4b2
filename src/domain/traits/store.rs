use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use crate::application::errors::StorageError;
use crate::domain::entities::ScopeId;

/// What a keyed store holds; doubles as the file/table name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Emotes,
    Keywords,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Emotes => "emotes",
            StoreKind::Keywords => "keywords",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence trait - one JSON object per (kind, scope) pair
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Read the stored object, creating an empty one when none exists yet
    async fn load(&self, kind: StoreKind, scope: ScopeId) -> Result<Map<String, Value>, StorageError>;

    /// Replace the stored object
    async fn save(&self, kind: StoreKind, scope: ScopeId, entries: &Map<String, Value>) -> Result<(), StorageError>;

    /// Whether non-trivial data is currently persisted for the pair
    async fn has_data(&self, kind: StoreKind, scope: ScopeId) -> Result<bool, StorageError>;

    /// Where the pair lives, for log lines
    fn describe(&self, kind: StoreKind, scope: ScopeId) -> String;
}
