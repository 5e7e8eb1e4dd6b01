//! Command dispatch, argument helpers and name resolution for the shell.

use std::{io, path::PathBuf};

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::{dice::DiceRoller, errors::LedgerError, utils::PathResolver},
    domain::{ItemAttributes, ItemId, ItemStack},
    storage::{ItemQuery, JsonStore, LedgerStore, QueryOrder},
};

pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::core::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
use super::shell::{parse_command_line, InteractiveSource, LineEvent, LineSource, ScriptSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Input(message) => CommandError::InvalidArguments(message),
            CliError::Command(message) => CommandError::Message(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::InvalidArguments(message) => CliError::Input(message),
            other => CliError::Command(other.to_string()),
        }
    }
}

/// What a command token refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Item(ItemStack),
    Text(String),
}

/// Resolves a token to a stack: first as an id, then as a name (the most
/// recently updated match wins). Names containing `%` or `_` are matched as
/// LIKE patterns, other names must match exactly. Anything else stays text.
pub fn resolve<S: LedgerStore + ?Sized>(store: &S, token: &str) -> Result<Resolved, LedgerError> {
    let token = token.trim();
    if let Ok(id) = token.strip_prefix('#').unwrap_or(token).parse::<u64>() {
        if let Some(item) = store.item(ItemId(id))? {
            return Ok(Resolved::Item(item));
        }
    }
    let query = if token.contains(['%', '_']) {
        ItemQuery::name_like(token)
    } else {
        ItemQuery::all()
            .with_name(token)
            .ordered(QueryOrder::UpdatedDesc)
    };
    Ok(match store.find_first_item(&query)? {
        Some(item) => Resolved::Item(item),
        None => Resolved::Text(token.to_string()),
    })
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let registry = commands::registry();
        let input: Box<dyn LineSource> = match mode {
            CliMode::Interactive => Box::new(InteractiveSource::new(registry.names().collect())?),
            CliMode::Script => Box::new(ScriptSource::stdin()),
        };
        Self::assemble(mode, PathResolver::base_dir(), registry, input)
    }

    /// Builds a context rooted at `base_dir` that reads from `input`.
    pub fn with_input(
        mode: CliMode,
        base_dir: PathBuf,
        input: Box<dyn LineSource>,
    ) -> Result<Self, CliError> {
        Self::assemble(mode, base_dir, commands::registry(), input)
    }

    fn assemble(
        mode: CliMode,
        base_dir: PathBuf,
        registry: CommandRegistry,
        input: Box<dyn LineSource>,
    ) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;
        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences::from_config(&config));
        let store = JsonStore::open(
            Some(base_dir.clone()),
            &config.inventory,
            Some(config.backup_retention),
        )?;
        let roller = DiceRoller::from_seed(config.dice_seed);

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            base_dir,
            store,
            config_manager,
            config,
            roller,
            combat: None,
            in_turn_loop: false,
            input,
            last_command: None,
            running: true,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn read_line(&mut self, prompt: &str) -> Result<LineEvent, CliError> {
        self.input.read_line(prompt)
    }

    /// Tokenizes and dispatches one line of input.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(&err);
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let raw = &tokens[0];
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_hint(format!("Did you mean `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(LedgerError::InvalidState(message))
                if message.contains("gold tracking") =>
            {
                cli_io::print_error(message);
                cli_io::print_hint("Try `gold setup 0` to start tracking gold.");
            }
            other => cli_io::print_error(other),
        }
    }

    /// Resolves a token that must name an existing stack.
    pub(crate) fn resolve_item(&self, token: &str) -> Result<ItemStack, CommandError> {
        match resolve(&self.store, token)? {
            Resolved::Item(item) => Ok(item),
            Resolved::Text(text) => {
                Err(LedgerError::NotFound(format!("no item matches `{}`", text)).into())
            }
        }
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Applies a freshly loaded or edited configuration to the running shell.
    pub(crate) fn apply_config(&mut self, config: Config) -> CommandResult {
        let reopen = config.inventory != self.config.inventory
            || config.backup_retention != self.config.backup_retention;
        let reseed = config.dice_seed != self.config.dice_seed;
        output::set_preferences(OutputPreferences::from_config(&config));
        if reopen {
            self.store = JsonStore::open(
                Some(self.base_dir.clone()),
                &config.inventory,
                Some(config.backup_retention),
            )?;
        }
        if reseed {
            self.roller = DiceRoller::from_seed(config.dice_seed);
        }
        self.config = config;
        Ok(())
    }
}

/// Parses a strictly positive whole number.
pub(crate) fn parse_quantity(token: &str, what: &str) -> Result<i64, CommandError> {
    match token.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "{} must be a positive whole number (got `{}`)",
            what, token
        ))),
    }
}

/// Parses a whole number of gold pieces, sign allowed.
pub(crate) fn parse_gold(token: &str) -> Result<i64, CommandError> {
    token.parse::<i64>().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a whole number of gold", token))
    })
}

fn parse_amount(key: &str, value: &str) -> Result<f64, CommandError> {
    value
        .trim_start_matches('$')
        .trim_end_matches("lbs")
        .parse::<f64>()
        .map_err(|_| {
            CommandError::InvalidArguments(format!("{} must be a number (got `{}`)", key, value))
        })
}

/// Splits item arguments into plain words and `key=value` attributes.
/// A bare `magic` word sets the magic flag.
pub(crate) fn split_item_args<'a>(
    args: &[&'a str],
) -> Result<(Vec<&'a str>, ItemAttributes), CommandError> {
    let mut words = Vec::new();
    let mut attributes = ItemAttributes::default();
    for arg in args {
        if arg.eq_ignore_ascii_case("magic") {
            attributes.magic = Some(true);
            continue;
        }
        let Some((key, value)) = arg.split_once('=') else {
            words.push(*arg);
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "price" => attributes.price = Some(parse_amount(key, value)?),
            "weight" => attributes.weight = Some(parse_amount(key, value)?),
            "notes" | "note" => attributes.notes = Some(value.to_string()),
            "magic" => {
                attributes.magic = Some(match value.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => {
                        return Err(CommandError::InvalidArguments(format!(
                            "magic expects true or false (got `{}`)",
                            value
                        )))
                    }
                })
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown item attribute `{}` (expected price, weight, notes or magic)",
                    other
                )))
            }
        }
    }
    Ok((words, attributes))
}

/// Splits `<item...> [qty]`: a trailing number is the quantity when more than
/// one word was given.
pub(crate) fn split_trailing_quantity<'a>(
    args: &[&'a str],
) -> Result<(String, Option<i64>), CommandError> {
    match args {
        [] => Err(CommandError::InvalidArguments("missing item".into())),
        [item] => Ok((item.to_string(), None)),
        [item @ .., last] => match last.parse::<i64>() {
            Ok(_) => Ok((item.join(" "), Some(parse_quantity(last, "quantity")?))),
            Err(_) => Ok((args.join(" "), None)),
        },
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base_dir: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    use super::shell::{run_loop, QueuedLines};

    let mut context = ShellContext::with_input(
        CliMode::Script,
        base_dir.to_path_buf(),
        Box::new(QueuedLines::new(lines.iter().copied())),
    )?;
    run_loop(&mut context)?;
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{GoldService, InventoryService};
    use crate::domain::CombatPhase;
    use tempfile::tempdir;

    #[test]
    fn script_buys_and_drops_items() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path(),
            &[
                "buy 3 \"Potion of Healing\" price=50 weight=0.5 magic",
                "buy 1 Rope price=1 weight=10 notes='hemp, 50ft'",
                "drop Rope",
                "drop 1 2",
            ],
        )
        .unwrap();

        let potion = context.store.item(ItemId(1)).unwrap().unwrap();
        assert_eq!(potion.remaining_quantity(), 1);
        assert!(potion.is_magic);
        let rope = context.store.item(ItemId(2)).unwrap().unwrap();
        assert!(!rope.is_held);
        assert_eq!(rope.notes.as_deref(), Some("hemp, 50ft"));
    }

    #[test]
    fn errors_do_not_stop_the_script() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path(),
            &["drop 99", "buy 1 Lantern", "gain 2 Torch", "gold setup 10", "gold earn 5"],
        )
        .unwrap();
        let items = InventoryService::list_all(&context.store).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Torch");
        assert_eq!(GoldService::total_earned(&context.store).unwrap(), 15);
    }

    #[test]
    fn gain_by_name_adds_to_existing_stack() {
        let dir = tempdir().unwrap();
        let context =
            process_script(dir.path(), &["gain 2 Arrow", "gain 3 Arrow", "gain 1 'Arrow, silver'"])
                .unwrap();
        let items = InventoryService::list_all(&context.store).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].remaining_quantity(), 5);
    }

    #[test]
    fn combat_loop_reads_turns_from_the_same_input() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path(),
            &[
                "combat new",
                "combat add mook1 5",
                "combat add mook2 10",
                "combat add shalizara 15",
                "combat start",
                "next",
                "gain 1 'Goblin Ear'",
                "exit",
                "finish",
                "gold setup 3",
            ],
        )
        .unwrap();
        let session = context.combat.as_ref().unwrap();
        assert_eq!(session.phase(), CombatPhase::Ended);
        assert_eq!(session.actors()[0].name, "shalizara");
        assert_eq!(session.round(), 1);
        assert!(!context.in_turn_loop);
        assert_eq!(InventoryService::list_all(&context.store).unwrap().len(), 1);
        assert_eq!(GoldService::total_earned(&context.store).unwrap(), 3);
    }

    #[test]
    fn quit_stops_reading() {
        let dir = tempdir().unwrap();
        let context = process_script(dir.path(), &["quit", "gain 1 Torch"]).unwrap();
        assert!(!context.running);
        assert!(InventoryService::list_all(&context.store).unwrap().is_empty());
    }

    #[test]
    fn resolve_prefers_ids_then_exact_names() {
        let dir = tempdir().unwrap();
        let context =
            process_script(dir.path(), &["gain 1 Rope", "gain 1 'Rope of Climbing'"]).unwrap();
        assert!(matches!(
            resolve(&context.store, "2").unwrap(),
            Resolved::Item(item) if item.name == "Rope of Climbing"
        ));
        assert!(matches!(
            resolve(&context.store, "Rope").unwrap(),
            Resolved::Item(item) if item.id == ItemId(1)
        ));
        assert!(matches!(
            resolve(&context.store, "Rope%").unwrap(),
            Resolved::Item(_)
        ));
        assert_eq!(
            resolve(&context.store, "Grappling Hook").unwrap(),
            Resolved::Text("Grappling Hook".into())
        );
    }

    #[test]
    fn item_args_split_words_and_attributes() {
        let (words, attrs) =
            split_item_args(&["Bag", "of", "Holding", "price=2500", "weight=15lbs", "magic"])
                .unwrap();
        assert_eq!(words, vec!["Bag", "of", "Holding"]);
        assert_eq!(attrs.price, Some(2500.0));
        assert_eq!(attrs.weight, Some(15.0));
        assert_eq!(attrs.magic, Some(true));
        assert!(split_item_args(&["colour=red"]).is_err());
    }

    #[test]
    fn trailing_quantity_is_optional() {
        assert_eq!(
            split_trailing_quantity(&["Potion", "of", "Healing", "2"]).unwrap(),
            ("Potion of Healing".to_string(), Some(2))
        );
        assert_eq!(
            split_trailing_quantity(&["12"]).unwrap(),
            ("12".to_string(), None)
        );
        assert!(split_trailing_quantity(&["Rope", "0"]).is_err());
    }
}
