use crate::cli::core::{parse_gold, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::services::{format_amount, GoldService};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "gold",
        "Show or update your gold",
        "gold [setup <n>|earn <n>|spend <n>|set <n>]",
        cmd_gold,
    )]
}

fn cmd_gold(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return show_summary(context);
    };
    let amount = || -> Result<i64, CommandError> {
        let token = args.get(1).ok_or_else(|| {
            CommandError::InvalidArguments(format!("usage: gold {} <n>", action))
        })?;
        parse_gold(token)
    };

    let store = &mut context.store;
    match action.to_lowercase().as_str() {
        "setup" => {
            let initial = if args.len() > 1 { amount()? } else { 0 };
            GoldService::setup(store, initial)?;
            io::print_success(format!("Gold tracking set up with {}gp", initial));
        }
        "earn" => io::print_success(GoldService::earn(store, amount()?)?),
        "spend" => io::print_success(GoldService::record_misc_spend(store, amount()?)?),
        "set" => {
            let total = GoldService::set_total_earned(store, amount()?)?;
            io::print_success(format!("Total earned is now {}gp", total));
        }
        "show" | "summary" => return show_summary(context),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown gold action `{}` (expected setup, earn, spend or set)",
                other
            )))
        }
    }
    io::print_info(format!(
        "Balance: {}gp",
        format_amount(GoldService::current_balance(&context.store)?)
    ));
    Ok(())
}

fn show_summary(context: &ShellContext) -> CommandResult {
    let summary = GoldService::summary(&context.store)?;
    output_section("Gold");
    io::print_info(format!("  Earned       : {}gp", summary.earned));
    io::print_info(format!(
        "  Spent (items): {}gp",
        format_amount(summary.item_spending)
    ));
    io::print_info(format!("  Spent (other): {}gp", summary.misc_spending));
    io::print_info(format!("  Balance      : {}gp", format_amount(summary.balance)));
    Ok(())
}
