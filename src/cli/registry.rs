use std::collections::HashMap;

use crate::cli::core::CommandResult;
use crate::cli::shell_context::ShellContext;

/// Handler invoked with the shell state and the arguments after the command name.
pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// One row of the command table, also used to render `help`.
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Shell commands in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`. Re-registering a name replaces the handler but keeps its
    /// original position.
    pub fn register(&mut self, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, entry).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    /// Entries in registration order.
    pub fn list(&self) -> Vec<&CommandEntry> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    /// Command names, used for completion and suggestions.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::CommandError;

    fn ok(_: &mut ShellContext, _: &[&str]) -> CommandResult {
        Ok(())
    }

    fn fail(_: &mut ShellContext, _: &[&str]) -> CommandResult {
        Err(CommandError::InvalidArguments("nope".into()))
    }

    #[test]
    fn reregistering_keeps_position_and_swaps_handler() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("buy", "Buy an item", "buy <name>", ok));
        registry.register(CommandEntry::new("roll", "Roll dice", "roll <expr>", ok));
        registry.register(CommandEntry::new("buy", "Buy items", "buy <name> [qty]", fail));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["buy", "roll"]);
        assert_eq!(registry.list().len(), 2);
        assert_eq!(registry.get("buy").map(|entry| entry.usage), Some("buy <name> [qty]"));
        assert!(registry.handler("sell").is_none());
        assert!(registry.handler("buy").is_some());
    }
}
