//! Command dispatcher - Routes commands to handlers after policy checks

use std::collections::BTreeMap;

use crate::application::context::AppContext;
use crate::application::errors::DispatchError;
use crate::domain::entities::{Command, Message};
use crate::domain::traits::HandlerResult;

/// Typed command registry.
///
/// The table is filled during startup and only read afterwards. `read_only`
/// is fixed at construction.
pub struct CommandDispatcher {
    commands: BTreeMap<String, Command>,
    read_only: bool,
}

impl CommandDispatcher {
    pub fn new(read_only: bool) -> Self {
        Self {
            commands: BTreeMap::new(),
            read_only,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Register a command; the first registration of a name wins
    pub fn register(&mut self, command: Command) -> Result<(), DispatchError> {
        if self.commands.contains_key(&command.name) {
            return Err(DispatchError::DuplicateCommand(command.name));
        }
        tracing::debug!(
            command = %command.name,
            read_write = command.read_write,
            restricted = command.allowed_users.is_some(),
            "Registered command"
        );
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// All registered names, sorted
    pub fn known_command_names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Check policy, then run the handler.
    ///
    /// The permission check always comes before the read-only check, so an
    /// unauthorized write is reported as `PermissionDenied`. Handler errors
    /// are returned untouched.
    pub async fn dispatch(&self, ctx: &AppContext, name: &str, message: &Message) -> HandlerResult {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

        if !command.may_use(message.author.id) {
            return Err(DispatchError::PermissionDenied {
                scope: message.scope,
                author: message.author.clone(),
                command: command.name.clone(),
            }
            .into());
        }

        if command.read_write && self.read_only {
            return Err(DispatchError::WriteDenied(command.name.clone()).into());
        }

        tracing::debug!(command = %command.name, author = %message.author, "Invoking command");
        command.handler.invoke(ctx, message).await
    }
}
