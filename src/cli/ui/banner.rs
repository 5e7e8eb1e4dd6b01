use std::io::{self, Write};

use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};

use crate::cli::output::{self, current_preferences};
use crate::cli::shell_context::ShellContext;
use crate::utils::build_info;

pub struct Banner;

impl Banner {
    /// Clears the terminal and prints the startup banner.
    pub fn render(context: &ShellContext) -> io::Result<()> {
        Self::clear_screen()?;
        output::section(format!("Tabletop Ledger {}", build_info::CLI_VERSION));
        output::info(format!("Inventory `{}`", context.store.inventory().name));
        output::info("Type `help` to list commands, `quit` to leave.");
        Ok(())
    }

    pub fn clear_screen() -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.execute(terminal::Clear(ClearType::All))?;
        stdout.execute(cursor::MoveTo(0, 0))?;
        stdout.flush()
    }

    /// Prompt shown before each command.
    pub fn prompt(context: &ShellContext) -> String {
        let arrow = if current_preferences().plain_mode() {
            ">"
        } else {
            "⮞"
        };
        format!("{} {} ", context.store.inventory().name, arrow)
    }

    /// Prompt shown while waiting for the current actor to finish a turn.
    pub fn turn_prompt(actor: &str, round: u32) -> String {
        let arrow = if current_preferences().plain_mode() {
            ">"
        } else {
            "⮞"
        };
        format!("[round {}] {} {} ", round, actor, arrow)
    }
}
