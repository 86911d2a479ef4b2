use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::UserId;
use crate::domain::traits::CommandHandler;

/// Represents a bot command
///
/// Policy is declarative: `read_write` commands are refused in read-only
/// mode, and `allowed_users` (when present) restricts who may invoke it.
/// The dispatcher checks both before the handler runs.
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
    pub read_write: bool,
    pub allowed_users: Option<HashSet<UserId>>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            handler: Arc::new(handler),
            read_write: false,
            allowed_users: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Mark the command as mutating persisted state
    pub fn read_write(mut self) -> Self {
        self.read_write = true;
        self
    }

    pub fn allowed_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.allowed_users = Some(users.into_iter().collect());
        self
    }

    pub fn owner_only(self, owner: UserId) -> Self {
        self.allowed_users([owner])
    }

    pub fn may_use(&self, user: UserId) -> bool {
        match &self.allowed_users {
            Some(users) => users.contains(&user),
            None => true,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("read_write", &self.read_write)
            .field("allowed_users", &self.allowed_users)
            .finish_non_exhaustive()
    }
}
