use super::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of reactions that can be added to a message.
pub const MAX_REACTIONS: usize = 20;
/// Maximum number of characters a text message may contain.
pub const MAX_CHARACTERS: usize = 2000;

/// Partition key for stores and automata (a guild/server id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ScopeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// An inbound chat message as delivered by the transport
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel_id: ChannelId,
    /// `None` for direct messages
    pub scope: Option<ScopeId>,
    pub author: User,
    /// Raw text, mentions still encoded
    pub content: String,
    /// Text with mentions resolved to display names
    pub clean_content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel_id: impl Into<ChannelId>, author: User, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            scope: None,
            author,
            clean_content: content.clone(),
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn in_scope(mut self, scope: impl Into<ScopeId>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_clean_content(mut self, clean: impl Into<String>) -> Self {
        self.clean_content = clean.into();
        self
    }

    /// Human-readable location, used in log lines
    pub fn location(&self) -> String {
        match self.scope {
            Some(scope) => format!("guild {}", scope),
            None => "direct messages".to_string(),
        }
    }
}
