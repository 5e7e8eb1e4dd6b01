use chrono::Local;

use crate::cli::core::{parse_quantity, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::core::dice::DiceExpr;
use crate::core::services::RollService;
use crate::domain::Displayable;

const DEFAULT_HISTORY: usize = 10;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("roll", "Roll dice, e.g. 3d6", "roll [NdS]", cmd_roll),
        CommandEntry::new("rolls", "Show recent rolls", "rolls [count]", cmd_rolls),
    ]
}

fn cmd_roll(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let expr: DiceExpr = args.first().copied().unwrap_or("1d20").parse()?;
    let roll = RollService::roll(&mut context.store, &mut context.roller, expr)?;
    io::print_success(roll.display_label());
    Ok(())
}

fn history_limit(token: &str) -> Result<usize, CommandError> {
    let count = parse_quantity(token, "count")?;
    usize::try_from(count)
        .map_err(|_| CommandError::InvalidArguments(format!("count `{}` is too large", token)))
}

fn cmd_rolls(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        Some(token) => history_limit(token)?,
        None => DEFAULT_HISTORY,
    };
    let rolls = RollService::history(&context.store, limit)?;
    if rolls.is_empty() {
        io::print_info("No rolls yet.");
    }
    for roll in rolls {
        let when = roll.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        io::print_info(format!("  {}  {}", when, roll.display_label()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_accepts_only_counts_that_fit() {
        assert_eq!(history_limit("25").unwrap(), 25);
        assert!(matches!(history_limit("0"), Err(CommandError::InvalidArguments(_))));
        assert!(history_limit("many").is_err());

        let huge = i64::MAX.to_string();
        assert_eq!(history_limit(&huge).ok(), usize::try_from(i64::MAX).ok());
    }
}
