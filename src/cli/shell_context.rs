use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    core::{combat::CombatSession, dice::DiceRoller},
    storage::JsonStore,
};

use super::registry::CommandRegistry;
use super::shell::LineSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can reach.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub base_dir: PathBuf,
    pub store: JsonStore,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub roller: DiceRoller,
    /// Combat being formed or fought.
    pub combat: Option<CombatSession>,
    pub(crate) in_turn_loop: bool,
    pub(crate) input: Box<dyn LineSource>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, inventory: {:?}, combat: {:?} }}",
            self.running,
            self.last_command,
            self.store.inventory().name,
            self.combat.as_ref().map(|session| session.phase())
        )
    }
}
