pub mod combat;
pub mod config;
pub mod dice;
pub mod gold;
pub mod inventory;
pub mod system;

use crate::cli::registry::{CommandEntry, CommandRegistry};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(inventory::definitions());
    commands.extend(gold::definitions());
    commands.extend(dice::definitions());
    commands.extend(combat::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for entry in all_definitions() {
        registry.register(entry);
    }
    registry
}
